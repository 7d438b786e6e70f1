// 核心解析与聚合模块
pub mod aggregate;
pub mod sqltrace;

// 运行支撑模块
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod scanner;

// 导出模块
pub mod exporter;
