//! 并发聚合模块
//!
//! 扫描线程共享同一个聚合器，按记录折叠进两个聚合结构：
//! 按语句类别的表用量计数、按 (表, 调用方) 的耗时统计。
//! DashMap 保证同键更新线性化，不同键之间不互相串行。

use dashmap::DashMap;
use std::sync::Mutex;

use crate::sqltrace::{
    classify, extract_tables, extract_where, LogRecord, StatementKind,
};

/// 扫描线程向聚合器投递记录的接口
pub trait RecordSink: Sync {
    /// 折叠一条记录，实现必须可被多线程并发调用
    fn accept(&self, record: &LogRecord);
}

/// 单个 (表, 调用方) 的耗时累加器，0ms 样本不参与
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LatencyAcc {
    /// 有效样本数（elapsed > 0）
    pub count: u64,
    /// 有效样本耗时总和
    pub sum_ms: u64,
    /// 最小耗时
    pub min_ms: u64,
    /// 最大耗时
    pub max_ms: u64,
}

impl LatencyAcc {
    /// 累加一个样本，0ms 直接忽略
    pub fn add(&mut self, ms: u64) {
        if ms == 0 {
            return;
        }
        if self.count == 0 {
            self.min_ms = ms;
            self.max_ms = ms;
        } else {
            self.min_ms = self.min_ms.min(ms);
            self.max_ms = self.max_ms.max(ms);
        }
        self.count += 1;
        self.sum_ms += ms;
    }

    /// 平均耗时，无有效样本时为 0
    pub fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_ms as f64 / self.count as f64
        }
    }
}

/// workbook 模式的聚合器：表用量 + 每表每调用方耗时
#[derive(Debug, Default)]
pub struct UsageAggregates {
    /// (语句类别, 表名) -> 出现次数，0ms 记录也计数
    usage: DashMap<(StatementKind, String), u64>,
    /// (表名, 调用方) -> 耗时统计，仅 elapsed > 0 的样本
    latency: DashMap<(String, String), LatencyAcc>,
}

impl UsageAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某一类别下所有表的用量快照（未排序）
    pub fn usage_rows(&self, kind: StatementKind) -> Vec<(String, u64)> {
        self.usage
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| (entry.key().1.clone(), *entry.value()))
            .collect()
    }

    /// 所有 (表, 调用方, 耗时统计) 快照（未排序）
    pub fn latency_rows(&self) -> Vec<(String, String, LatencyAcc)> {
        self.latency
            .iter()
            .map(|entry| {
                let (table, caller) = entry.key().clone();
                (table, caller, *entry.value())
            })
            .collect()
    }
}

impl RecordSink for UsageAggregates {
    fn accept(&self, record: &LogRecord) {
        let Some(kind) = classify(&record.sql) else {
            return;
        };
        let tables = extract_tables(&record.sql, kind);
        if tables.is_empty() {
            return;
        }

        let caller = record.caller_key();
        for table in tables {
            // 用量：不剔除 0ms
            *self.usage.entry((kind, table.clone())).or_insert(0) += 1;
            // 耗时：LatencyAcc 内部忽略 0ms 样本
            self.latency
                .entry((table, caller.to_string()))
                .or_default()
                .add(record.elapsed_ms);
        }
    }
}

/// legacy stats 模式的聚合器：仅按调用方，0ms 样本计入
#[derive(Debug, Default)]
pub struct CallerStats {
    /// 调用方 -> (次数, 耗时总和)
    totals: DashMap<String, (u64, u64)>,
}

impl CallerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// (调用方, 次数, 耗时总和) 快照（未排序）
    pub fn rows(&self) -> Vec<(String, u64, u64)> {
        self.totals
            .iter()
            .map(|entry| {
                let (count, sum) = *entry.value();
                (entry.key().clone(), count, sum)
            })
            .collect()
    }
}

impl RecordSink for CallerStats {
    fn accept(&self, record: &LogRecord) {
        let mut entry = self
            .totals
            .entry(record.caller_key().to_string())
            .or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.elapsed_ms;
    }
}

/// legacy where 模式的收集器：每条含 WHERE 子句的记录产生一行
#[derive(Debug, Default)]
pub struct WhereRows {
    rows: Mutex<Vec<(String, String)>>,
}

impl WhereRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收集的 (调用方, where 子句) 行
    pub fn rows(&self) -> Vec<(String, String)> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

impl RecordSink for WhereRows {
    fn accept(&self, record: &LogRecord) {
        if let Some(clause) = extract_where(&record.sql) {
            if let Ok(mut rows) = self.rows.lock() {
                rows.push((record.caller_key().to_string(), clause));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn record(caller: &str, elapsed_ms: u64, sql: &str) -> LogRecord {
        LogRecord {
            caller: Some(caller.to_string()),
            elapsed_ms,
            sql: sql.to_string(),
        }
    }

    #[test]
    fn test_usage_counts_each_table_once_per_record() {
        let agg = UsageAggregates::new();
        agg.accept(&record(
            "a.B#c:1",
            5,
            "select * from orders o join users u on o.uid=u.id",
        ));

        let mut rows = agg.usage_rows(StatementKind::Read);
        rows.sort();
        assert_eq!(
            rows,
            vec![("orders".to_string(), 1), ("users".to_string(), 1)]
        );
    }

    #[test]
    fn test_unrecognized_and_tableless_records_dropped() {
        let agg = UsageAggregates::new();
        agg.accept(&record("a.B#c:1", 5, "truncate table t"));
        agg.accept(&record("a.B#c:1", 5, "select 1"));
        assert!(agg.usage_rows(StatementKind::Read).is_empty());
        assert!(agg.latency_rows().is_empty());
    }

    #[test]
    fn test_zero_elapsed_counts_usage_but_not_latency() {
        let agg = UsageAggregates::new();
        for _ in 0..5 {
            agg.accept(&record("a.B#c:1", 0, "select * from t"));
        }
        agg.accept(&record("a.B#c:1", 10, "select * from t"));

        assert_eq!(
            agg.usage_rows(StatementKind::Read),
            vec![("t".to_string(), 6)]
        );

        let latency = agg.latency_rows();
        assert_eq!(latency.len(), 1);
        let (table, caller, acc) = &latency[0];
        assert_eq!(table, "t");
        assert_eq!(caller, "a.B#c:1");
        assert_eq!(acc.count, 1);
        assert_eq!(acc.sum_ms, 10);
        assert_eq!(acc.min_ms, 10);
        assert_eq!(acc.max_ms, 10);
        assert!((acc.avg_ms() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_latency_min_max_tracking() {
        let mut acc = LatencyAcc::default();
        acc.add(0);
        acc.add(30);
        acc.add(10);
        acc.add(20);
        assert_eq!(acc.count, 3);
        assert_eq!(acc.min_ms, 10);
        assert_eq!(acc.max_ms, 30);
        assert_eq!(acc.sum_ms, 60);
        assert!((acc.avg_ms() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_caller_stats_include_zero_samples() {
        let stats = CallerStats::new();
        stats.accept(&record("a.B#c:1", 0, "select * from t"));
        stats.accept(&record("a.B#c:1", 8, "select * from t"));
        // stats 模式不做分类，无法识别的语句同样计数
        stats.accept(&record("a.B#c:1", 2, "truncate table t"));

        assert_eq!(stats.rows(), vec![("a.B#c:1".to_string(), 3, 10)]);
    }

    #[test]
    fn test_where_rows_collects_only_matching_records() {
        let rows = WhereRows::new();
        rows.accept(&record("a.B#c:1", 1, "select * from t where  id =  1"));
        rows.accept(&record("a.B#c:1", 1, "select * from t"));
        assert_eq!(
            rows.rows(),
            vec![("a.B#c:1".to_string(), "id = 1".to_string())]
        );
    }

    #[test]
    fn test_concurrent_updates_not_lost() {
        let agg = Arc::new(UsageAggregates::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let agg = Arc::clone(&agg);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    agg.accept(&record("a.B#c:1", 1, "select * from t"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            agg.usage_rows(StatementKind::Read),
            vec![("t".to_string(), 8000)]
        );
        let latency = agg.latency_rows();
        assert_eq!(latency[0].2.count, 8000);
        assert_eq!(latency[0].2.sum_ms, 8000);
    }
}
