//! WHERE 子句提取（legacy where 报表用）
//!
//! 取 `where` 关键字到下一个子句关键字（group by / order by / having /
//! limit / offset / fetch / for update）或文本结尾之间的内容，
//! 空白折叠成单个空格。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHERE_RE: Regex = Regex::new(r"(?is)\bwhere\b").unwrap();
    static ref CLAUSE_END_RE: Regex = Regex::new(
        r"(?is)\b(group\s+by|order\s+by|having|limit|offset|fetch|for\s+update)\b"
    )
    .unwrap();
}

/// 折叠空白：连续空白变为单个空格，并去掉首尾空白
fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 提取归一化后的 WHERE 子句，提取不到或内容为空白时返回 `None`
pub fn extract_where(sql: &str) -> Option<String> {
    let m = WHERE_RE.find(sql)?;
    let rest = &sql[m.end()..];
    let clause = match CLAUSE_END_RE.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    };
    let clause = normalize_space(clause);
    if clause.is_empty() { None } else { Some(clause) }
}
