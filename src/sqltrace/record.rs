//! 单行日志字段抽取
//!
//! 拦截器输出的日志行形如：
//!
//! ```text
//! [Time: 15 ms][Caller: com.a.B#c:10][SQL: select * from orders o join users u on o.uid=u.id]
//! ```
//!
//! 三个标记均为固定大小写（`Time:` / `Caller:` / `SQL:`），标记之间
//! 允许任意空白。缺少 `[SQL:` 标记的行直接跳过，不视为错误。

use lazy_static::lazy_static;
use regex::Regex;

/// 日志行中缺少 Caller 标记时聚合使用的占位名
pub const UNKNOWN_CALLER: &str = "<unknown>";

lazy_static! {
    static ref TIME_RE: Regex =
        Regex::new(r"\[Time:\s*(\d+)\s*ms\]").unwrap();
    static ref CALLER_RE: Regex =
        Regex::new(r"\[Caller:\s*([^\]]+)\]").unwrap();
    // 非贪婪匹配到行尾最后一个右括号，SQL 文本自身可以包含 ] 之外的任意内容
    static ref SQL_RE: Regex = Regex::new(r"\[SQL:\s*(.+?)\]\s*$").unwrap();
}

/// 一条成功抽取的日志记录（瞬态，抽取后立即被聚合消费）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// 调用方标识，缺失时为 None
    pub caller: Option<String>,
    /// 执行耗时（毫秒），缺失或不可解析时为 0
    pub elapsed_ms: u64,
    /// SQL 文本
    pub sql: String,
}

impl LogRecord {
    /// 聚合键使用的调用方名：缺失时退化为 `<unknown>`
    pub fn caller_key(&self) -> &str {
        self.caller.as_deref().unwrap_or(UNKNOWN_CALLER)
    }
}

/// 从单行文本抽取 `LogRecord`。
///
/// 返回 `None` 表示该行不含可识别的 SQL 标记，应当被跳过。
/// 耗时标记缺失时默认为 0，数字溢出同样回退到 0。
pub fn extract_record(line: &str) -> Option<LogRecord> {
    // 快速路径：绝大多数行没有 SQL 标记
    if !line.contains("[SQL:") {
        return None;
    }

    let sql = SQL_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())?;

    let caller = CALLER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let elapsed_ms = TIME_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);

    Some(LogRecord { caller, elapsed_ms, sql })
}
