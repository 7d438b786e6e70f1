//! 日志初始化模块
//!
//! 使用 tracing 提供统一的日志输出：控制台 + logs 目录下按天滚动的文件。
//! 配置由命令行的 `--verbose` / `--no-log-file` 驱动。

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: Level,
    /// 是否同时写入 logs 目录（按天滚动）
    pub file_output: bool,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志级别
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 关闭文件输出，仅保留控制台
    pub fn console_only(mut self) -> Self {
        self.file_output = false;
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::INFO, file_output: true }
    }
}

static INIT_LOGGER: Once = Once::new();

/// 错误构造路径的兜底初始化：未显式初始化时退化为仅控制台输出
pub(crate) fn ensure_logger_initialized() {
    INIT_LOGGER.call_once(|| {
        init_logging(LogConfig::default().console_only());
    });
}

/// 初始化日志系统
///
/// `RUST_LOG` 环境变量优先于 `config.level`。重复初始化不视为错误，
/// 第二次调用会被安静地忽略。
pub fn init_logging(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let subscriber = Registry::default().with(env_filter);

    let console_layer = fmt::layer()
        .with_timer(SystemTime)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(true);

    if config.file_output {
        let file_appender =
            tracing_appender::rolling::daily("logs", "sqlusage");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_timer(SystemTime)
            .with_target(true)
            .with_ansi(false);

        if subscriber.with(console_layer).with(file_layer).try_init().is_ok() {
            // guard 持有后台写线程，进程存活期间不能被 drop
            std::mem::forget(guard);
            tracing::debug!("日志系统初始化完成，输出到控制台和 logs 目录");
        }
    } else if subscriber.with(console_layer).try_init().is_ok() {
        tracing::debug!("日志系统初始化完成，仅输出到控制台");
    }
}
