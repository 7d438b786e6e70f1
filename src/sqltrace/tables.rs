//! 表名提取与归一化
//!
//! 按语句类别做表面模式匹配：select 扫描 `from` / `join` 之后的标识符，
//! insert/update/delete 各取其固定位置的标识符。这里不是 SQL 解析器，
//! 括号内的派生表和子查询整体被排除在扫描之外。

use lazy_static::lazy_static;
use regex::Regex;

use super::classify::StatementKind;

// 标识符字符类：单词字符、反引号、双引号、句点、美元符、井号
lazy_static! {
    static ref FROM_RE: Regex =
        Regex::new(r#"(?i)\bfrom\s+([\w`".$#]+)"#).unwrap();
    static ref JOIN_RE: Regex =
        Regex::new(r#"(?i)\bjoin\s+([\w`".$#]+)"#).unwrap();
    static ref INSERT_RE: Regex =
        Regex::new(r#"(?i)\binsert\s+into\s+([\w`".$#]+)"#).unwrap();
    static ref UPDATE_RE: Regex =
        Regex::new(r#"(?i)\bupdate\s+([\w`".$#]+)"#).unwrap();
    static ref DELETE_RE: Regex =
        Regex::new(r#"(?i)\bdelete\s+(?:\w+\s+)?from\s+([\w`".$#]+)"#)
            .unwrap();
}

/// 把括号内的内容替换为空白（保留括号本身）。
///
/// select 路径在掩码后的文本上扫描 `from` / `join`，这样
/// `from (select ... from t2) x` 既不会把派生表当成表名，
/// 也不会误收子查询内部的 `from` 目标。
fn mask_parens(sql: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(sql.len());
    for ch in sql.chars() {
        match ch {
            '(' => {
                out.push('(');
                depth += 1;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(')');
            }
            _ if depth > 0 => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// 收集 `re` 在 `sql` 中的全部捕获，按首次出现顺序去重后追加到 `out`
fn collect_idents(re: &Regex, sql: &str, out: &mut Vec<String>) {
    for caps in re.captures_iter(sql) {
        if let Some(m) = caps.get(1) {
            let raw = m.as_str().trim();
            if raw.is_empty() {
                continue;
            }
            if !out.iter().any(|seen| seen == raw) {
                out.push(raw.to_string());
            }
        }
    }
}

/// 归一化提取到的原始表名。
///
/// 依次：首个逗号/分号处截断（多表列表只保留第一个）、
/// 去掉一个前导和尾随的反引号或双引号、保留最后一个句点之后的部分
/// （去 schema 限定）、首个空白处截断（去别名）、转小写。
/// 结果为空串表示该标识符被丢弃。幂等。
pub fn normalize_table(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(pos) = s.find([',', ';']) {
        s = &s[..pos];
    }
    s = s.strip_prefix(['`', '"']).unwrap_or(s);
    s = s.strip_suffix(['`', '"']).unwrap_or(s);
    if let Some(pos) = s.rfind('.') {
        s = &s[pos + 1..];
    }
    if let Some(pos) = s.find(char::is_whitespace) {
        s = &s[..pos];
    }
    s.to_lowercase()
}

/// 按语句类别提取去重后的归一化表名序列。
///
/// 返回空序列表示该记录不贡献任何聚合。
pub fn extract_tables(sql: &str, kind: StatementKind) -> Vec<String> {
    let mut raw = Vec::new();
    match kind {
        StatementKind::Read => {
            let masked = mask_parens(sql);
            collect_idents(&FROM_RE, &masked, &mut raw);
            collect_idents(&JOIN_RE, &masked, &mut raw);
        }
        StatementKind::Insert => collect_idents(&INSERT_RE, sql, &mut raw),
        StatementKind::Update => collect_idents(&UPDATE_RE, sql, &mut raw),
        StatementKind::Delete => collect_idents(&DELETE_RE, sql, &mut raw),
    }

    // 归一化后再次按首次出现顺序去重，丢弃空结果
    let mut tables = Vec::new();
    for ident in raw {
        let name = normalize_table(&ident);
        if !name.is_empty() && !tables.iter().any(|seen| seen == &name) {
            tables.push(name);
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use StatementKind::{Delete, Insert, Read, Update};

    #[test]
    fn test_select_from_and_join() {
        let tables = extract_tables(
            "select * from orders o join users u on o.uid=u.id",
            Read,
        );
        assert_eq!(tables, vec!["orders", "users"]);
    }

    #[test]
    fn test_derived_table_excluded() {
        // 括号内的派生表与子查询内部的 from 目标都不收集
        let tables = extract_tables(
            "select * from (select id from t2) x join t3 on x.id = t3.id",
            Read,
        );
        assert_eq!(tables, vec!["t3"]);
    }

    #[test]
    fn test_subquery_in_where_excluded() {
        let tables = extract_tables(
            "select a from t1 where id in (select id from t2)",
            Read,
        );
        assert_eq!(tables, vec!["t1"]);
    }

    #[test]
    fn test_insert_update_delete_targets() {
        assert_eq!(
            extract_tables("insert into audit_log (a, b) values (1, 2)", Insert),
            vec!["audit_log"]
        );
        assert_eq!(
            extract_tables("update schema1.users set name = 'x'", Update),
            vec!["users"]
        );
        assert_eq!(
            extract_tables("delete from sessions where id = 1", Delete),
            vec!["sessions"]
        );
        // delete 支持可选别名：delete t from t ...
        assert_eq!(
            extract_tables("delete t from tokens t where t.expired = 1", Delete),
            vec!["tokens"]
        );
    }

    #[test]
    fn test_schema_alias_and_quote_stripping() {
        assert_eq!(normalize_table("schema1.orders"), "orders");
        assert_eq!(normalize_table("`orders`"), "orders");
        assert_eq!(normalize_table("\"Orders\""), "orders");
        assert_eq!(normalize_table("orders o"), "orders");
        let tables = extract_tables("select * from schema1.orders o", Read);
        assert_eq!(tables, vec!["orders"]);
    }

    #[test]
    fn test_normalization_idempotent() {
        for name in ["orders", "t3", "audit_log"] {
            assert_eq!(normalize_table(name), name);
            assert_eq!(normalize_table(&normalize_table(name)), name);
        }
    }

    #[test]
    fn test_comma_truncation_keeps_first_entry() {
        // 多表列表只保留第一个
        assert_eq!(normalize_table("a,b"), "a");
        assert_eq!(normalize_table("a;drop"), "a");
        let tables = extract_tables("select * from a, b", Read);
        assert_eq!(tables, vec!["a"]);
    }

    #[test]
    fn test_duplicate_tables_counted_once_per_record() {
        let tables = extract_tables(
            "select * from orders o join orders o2 on o.id = o2.parent_id",
            Read,
        );
        assert_eq!(tables, vec!["orders"]);
        // 不同写法归一化到同一表名时也只保留一个
        let tables =
            extract_tables("select * from orders join schema1.orders", Read);
        assert_eq!(tables, vec!["orders"]);
    }

    #[test]
    fn test_empty_normalized_discarded() {
        assert_eq!(normalize_table("\"\""), "");
        assert!(extract_tables("select 1", Read).is_empty());
    }

    #[test]
    fn test_mask_parens_keeps_outer_text() {
        assert_eq!(mask_parens("a (bc) d"), "a (  ) d");
        // 括号不平衡时其余部分全部掩码
        assert_eq!(mask_parens("a (bc"), "a (  ");
    }
}
