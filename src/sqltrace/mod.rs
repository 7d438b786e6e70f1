//! SQL 拦截日志解析模块
//!
//! 提供单行字段抽取、语句分类、表名提取与归一化等纯函数。

pub mod classify;
pub mod record;
pub mod tables;
pub mod where_clause;

// 重新导出核心类型和函数
pub use classify::{classify, StatementKind};
pub use record::{extract_record, LogRecord, UNKNOWN_CALLER};
pub use tables::{extract_tables, normalize_table};
pub use where_clause::extract_where;
