//! SQL 语句分类
//!
//! 只看第一个出现的关键字，嵌套子查询或后续子句中的其他关键字
//! 不会改变分类结果。

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref OP_RE: Regex =
        Regex::new(r"(?i)\b(select|insert|update|delete)\b").unwrap();
}

/// SQL 语句类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatementKind {
    /// select 查询
    Read,
    /// insert 写入
    Insert,
    /// update 更新
    Update,
    /// delete 删除
    Delete,
}

impl StatementKind {
    /// 报表中的固定输出顺序
    pub const ALL: [StatementKind; 4] = [
        StatementKind::Read,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
    ];
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementKind::Read => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

/// 识别 SQL 文本的语句类别。
///
/// 大小写不敏感，按整词匹配第一个出现的关键字；
/// 无法识别时返回 `None`，该记录不参与任何按表聚合。
pub fn classify(sql: &str) -> Option<StatementKind> {
    let m = OP_RE.captures(sql)?;
    match m.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "select" => Some(StatementKind::Read),
        "insert" => Some(StatementKind::Insert),
        "update" => Some(StatementKind::Update),
        "delete" => Some(StatementKind::Delete),
        _ => None,
    }
}
