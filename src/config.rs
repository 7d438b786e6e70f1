//! 配置管理模块
//!
//! 运行配置来自命令行参数，扫描开始之前完成全部校验。
//! 配置错误与"没有可处理文件"使用不同的退出码（见 error 模块）。

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AnalysisError, Result, EXIT_CONFIG};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(
    name = "sqlusage-cli",
    version,
    about = "解析 p6spy 风格 SQL 拦截日志，生成表用量与耗时报表"
)]
pub struct Cli {
    /// 生成多 sheet 工作簿（Summary + PerTable）到指定路径，优先于 --mode
    #[arg(long, value_name = "PATH")]
    pub workbook: Option<PathBuf>,

    /// legacy CSV 报表模式
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<LegacyMode>,

    /// legacy 模式的输出 CSV 路径
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// 工作线程数，默认为可用硬件并行度
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// 输出 debug 级别日志
    #[arg(long)]
    pub verbose: bool,

    /// 不写 logs 目录，日志仅输出到控制台
    #[arg(long)]
    pub no_log_file: bool,

    /// 输入文件或目录（目录递归展开）
    #[arg(value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,
}

/// legacy 报表种类
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
pub enum LegacyMode {
    /// 按调用方的次数/平均耗时统计
    Stats,
    /// 每条记录的 WHERE 子句提取
    Where,
}

/// 输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    /// 多 sheet 工作簿
    Workbook,
    /// legacy 按调用方统计 CSV
    Stats,
    /// legacy WHERE 子句 CSV
    Where,
}

/// 一次运行的完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 输出模式
    pub mode: OutputMode,
    /// 输出文件路径
    pub out_path: PathBuf,
    /// 工作线程数
    pub thread_count: usize,
    /// 输入文件或目录列表
    pub inputs: Vec<PathBuf>,
}

/// clap 解析失败对应的退出码。
///
/// help / version 属于正常退出；其余解析失败（未知参数、`--threads`
/// 的数字解析失败等）与配置错误共用退出码，绝不与"没有可处理文件"
/// 的退出码混淆。
pub fn clap_exit_code(err: &clap::Error) -> i32 {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_CONFIG,
    }
}

/// 默认线程数：可用硬件并行度，探测失败时退化为 4
pub fn default_thread_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

impl Config {
    /// 由命令行参数构造配置并校验。
    ///
    /// `--workbook` 优先；否则必须同时给出 `--mode` 和 `--out`。
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let (mode, out_path) = if let Some(path) = cli.workbook {
            (OutputMode::Workbook, path)
        } else {
            match (cli.mode, cli.out) {
                (Some(LegacyMode::Stats), Some(path)) => {
                    (OutputMode::Stats, path)
                }
                (Some(LegacyMode::Where), Some(path)) => {
                    (OutputMode::Where, path)
                }
                (Some(_), None) => {
                    return Err(AnalysisError::config_error(
                        "--mode 需要配合 --out 指定输出路径",
                    ));
                }
                _ => {
                    return Err(AnalysisError::config_error(
                        "缺少输出目标: 请指定 --workbook 或 --mode 加 --out",
                    ));
                }
            }
        };

        let config = Self {
            mode,
            out_path,
            thread_count: cli.threads.unwrap_or_else(default_thread_count),
            inputs: cli.inputs,
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.thread_count == 0 {
            return Err(AnalysisError::config_error("线程数不能为0"));
        }
        if self.inputs.is_empty() {
            return Err(AnalysisError::config_error(
                "缺少输入路径: 请给出至少一个文件或目录",
            ));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(AnalysisError::config_error("输出路径不能为空"));
        }
        Ok(())
    }
}
