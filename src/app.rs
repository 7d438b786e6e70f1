//! 端到端运行流程
//!
//! 展开输入 → 并发扫描聚合 → 构建报表 → 序列化落盘。
//! 读取失败的文件写入输出文件旁的 scan_errors.txt 并继续运行。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::aggregate::{CallerStats, UsageAggregates, WhereRows};
use crate::config::{Config, OutputMode};
use crate::error::{AnalysisError, Result};
use crate::exporter::{CsvExporter, ReportExporter, WorkbookExporter};
use crate::report::{
    build_stats_report, build_where_report, build_workbook_report, Report,
};
use crate::scanner::{collect_files, scan_files};

/// 一次运行的结果摘要
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 展开后的待处理文件数
    pub total_files: usize,
    /// 读取失败的文件数
    pub failed_files: usize,
    /// 扫描加导出的总耗时
    pub elapsed: Duration,
}

/// 执行一次完整分析。
///
/// # Errors
/// - 配置非法返回 `AnalysisError::Config`
/// - 展开后没有可处理文件返回 `AnalysisError::NoInputFiles`
/// - 输出文件无法写入返回 `AnalysisError::Io`
pub fn run(config: &Config) -> Result<RunSummary> {
    config.validate()?;

    let files = collect_files(&config.inputs);
    if files.is_empty() {
        let inputs = config
            .inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AnalysisError::NoInputFiles(inputs));
    }

    tracing::info!(
        "处理 {} 个文件，线程数 {}",
        files.len(),
        config.thread_count
    );
    let start = Instant::now();

    let (report, scan_errors) = build_report(config, &files);

    write_scan_errors(&config.out_path, &scan_errors)?;

    let mut exporter: Box<dyn ReportExporter> = match config.mode {
        OutputMode::Workbook => {
            Box::new(WorkbookExporter::new(&config.out_path)?)
        }
        OutputMode::Stats | OutputMode::Where => {
            Box::new(CsvExporter::new(&config.out_path)?)
        }
    };
    exporter.export(&report)?;

    let elapsed = start.elapsed();
    tracing::info!(
        "已生成报表 ({}) => {}，耗时 {:.2?}",
        exporter.name(),
        config.out_path.display(),
        elapsed
    );

    Ok(RunSummary {
        total_files: files.len(),
        failed_files: scan_errors.len(),
        elapsed,
    })
}

/// 按输出模式扫描并构建逻辑报表
fn build_report(
    config: &Config,
    files: &[PathBuf],
) -> (Report, Vec<(String, String)>) {
    match config.mode {
        OutputMode::Workbook => {
            let agg = UsageAggregates::new();
            let errors = scan_files(files, config.thread_count, &agg);
            (build_workbook_report(&agg), errors)
        }
        OutputMode::Stats => {
            let stats = CallerStats::new();
            let errors = scan_files(files, config.thread_count, &stats);
            (build_stats_report(&stats), errors)
        }
        OutputMode::Where => {
            let rows = WhereRows::new();
            let errors = scan_files(files, config.thread_count, &rows);
            (build_where_report(&rows), errors)
        }
    }
}

/// 把读取失败的文件及原因写入输出文件旁的 scan_errors.txt。
///
/// 没有失败时不创建文件。写入失败返回 IO 错误。
fn write_scan_errors(
    out_path: &PathBuf,
    errors: &[(String, String)],
) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    let errors_path = out_path.with_file_name("scan_errors.txt");
    tracing::warn!(
        "{} 个文件读取失败，详情写入 {}",
        errors.len(),
        errors_path.display()
    );

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&errors_path)?;
    for (name, detail) in errors {
        writeln!(file, "{name}: {detail}")?;
        tracing::warn!("  {name}: {detail}");
    }
    Ok(())
}
