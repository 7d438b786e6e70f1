//! 报表构建模块
//!
//! 把聚合结果转换为逻辑报表：有序的节（section）、块（block）与
//! 固定列的行。物理序列化（工作簿 XML / CSV）由 exporter 负责。
//! 所有排序都带确定性的并列规则，同样的输入产生同样的报表。

use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{CallerStats, UsageAggregates, WhereRows};
use crate::sqltrace::StatementKind;

/// 逻辑报表：有序的节列表
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

/// 报表节，对应工作簿中的一个 sheet
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub name: String,
    pub blocks: Vec<Block>,
}

/// 节内的一个数据块：小标题 + 表头 + 数据行
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 平均耗时统一保留 3 位小数
fn fmt3(value: f64) -> String {
    format!("{value:.3}")
}

/// 构建 workbook 模式报表：Summary + PerTable 两个节。
///
/// Summary 按固定类别顺序输出四个块，行按用量降序、表名升序；
/// PerTable 按表名升序输出，每表的行按次数降序、调用方升序，
/// 没有任何有效样本（全部 0ms）的表整体省略。
pub fn build_workbook_report(agg: &UsageAggregates) -> Report {
    let mut summary_blocks = Vec::new();
    for kind in StatementKind::ALL {
        let mut rows = agg.usage_rows(kind);
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        summary_blocks.push(Block {
            title: format!("{kind} 表用量 (降序)"),
            header: vec!["table".to_string(), "usage_count".to_string()],
            rows: rows
                .into_iter()
                .map(|(table, count)| vec![table, count.to_string()])
                .collect(),
        });
    }

    // 按表分组，只保留有有效样本的调用方
    let mut per_table: BTreeMap<String, Vec<(String, _)>> = BTreeMap::new();
    for (table, caller, acc) in agg.latency_rows() {
        if acc.count == 0 {
            continue;
        }
        per_table.entry(table).or_default().push((caller, acc));
    }

    let mut table_blocks = Vec::new();
    for (table, mut callers) in per_table {
        callers.sort_by(|a, b| {
            b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0))
        });

        table_blocks.push(Block {
            title: format!("Table: {table}"),
            header: ["caller", "count", "avg_ms", "max_ms", "min_ms"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: callers
                .into_iter()
                .map(|(caller, acc)| {
                    vec![
                        caller,
                        acc.count.to_string(),
                        fmt3(acc.avg_ms()),
                        acc.max_ms.to_string(),
                        acc.min_ms.to_string(),
                    ]
                })
                .collect(),
        });
    }

    Report {
        sections: vec![
            Section { name: "Summary".to_string(), blocks: summary_blocks },
            Section { name: "PerTable".to_string(), blocks: table_blocks },
        ],
    }
}

/// 构建 legacy stats 报表：按调用方的原始统计，0ms 样本计入
pub fn build_stats_report(stats: &CallerStats) -> Report {
    let mut rows = stats.rows();
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    let block = Block {
        title: "stats".to_string(),
        header: ["caller", "count", "avg_ms"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: rows
            .into_iter()
            .map(|(caller, count, sum)| {
                let avg =
                    if count == 0 { 0.0 } else { sum as f64 / count as f64 };
                vec![caller, count.to_string(), fmt3(avg)]
            })
            .collect(),
    };

    Report {
        sections: vec![Section {
            name: "stats".to_string(),
            blocks: vec![block],
        }],
    }
}

/// 构建 legacy where 报表：每条含 WHERE 子句的记录一行
pub fn build_where_report(rows: &WhereRows) -> Report {
    let mut rows = rows.rows();
    rows.sort();

    let block = Block {
        title: "where".to_string(),
        header: ["caller", "where_clause"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: rows
            .into_iter()
            .map(|(caller, clause)| vec![caller, clause])
            .collect(),
    };

    Report {
        sections: vec![Section {
            name: "where".to_string(),
            blocks: vec![block],
        }],
    }
}
