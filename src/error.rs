//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。

/// 分析工具的结果类型
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// 无可用输入文件时的退出码
pub const EXIT_NO_INPUT: i32 = 2;
/// 配置错误时的退出码
pub const EXIT_CONFIG: i32 = 1;

/// SQL 用量分析错误类型
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置错误（缺少输出目标、线程数非法等）
    #[error("配置错误: {0}")]
    Config(String),

    /// 展开输入路径后没有任何可处理的日志文件
    #[error("未找到可处理的 .log / .log.gz / .gz 文件: {0}")]
    NoInputFiles(String),
}

impl AnalysisError {
    /// 创建一个配置错误
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        crate::logging::ensure_logger_initialized();
        tracing::error!("配置错误: {}", message);
        Self::Config(message)
    }

    /// 检查是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, AnalysisError::Io(_))
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, AnalysisError::Config(_))
    }

    /// 对应的进程退出码。
    ///
    /// 配置错误与"配置合法但没有可处理文件"使用不同退出码，
    /// 便于调用方（脚本）区分两种失败。
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalysisError::Config(_) => EXIT_CONFIG,
            AnalysisError::NoInputFiles(_) => EXIT_NO_INPUT,
            _ => EXIT_CONFIG,
        }
    }
}
