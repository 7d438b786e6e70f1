//! 文件发现与并发扫描
//!
//! 输入路径中的目录会被递归展开，只保留 `.log` / `.log.gz` / `.gz`
//! 结尾的文件；`.gz` 文件读取时透明解压。扫描由固定大小的线程池
//! 完成，每个文件恰好由一个线程处理，单个文件的读取失败只影响
//! 该文件自身。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use crate::aggregate::RecordSink;
use crate::error::Result;
use crate::sqltrace::extract_record;

/// 判断文件名是否为可处理的日志文件（大小写不敏感）
fn is_log_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".log")
        || lower.ends_with(".log.gz")
        || lower.ends_with(".gz")
}

/// 展开输入路径为待扫描文件列表。
///
/// 目录递归展开，普通文件按文件名后缀过滤；结果排序以保证
/// 同样的输入产生同样的处理顺序。
pub fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input) {
                match entry {
                    Ok(entry) => {
                        let path = entry.path();
                        if path.is_file()
                            && path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .is_some_and(is_log_like)
                        {
                            files.push(path.to_path_buf());
                        }
                    }
                    Err(e) => {
                        tracing::warn!("遍历目录失败: {e}");
                    }
                }
            }
        } else if input.is_file()
            && input
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_log_like)
        {
            files.push(input.clone());
        }
    }
    files.sort();
    files
}

/// 打开文件，`.gz` 后缀时透明解压
fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let is_gz = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if is_gz {
        Ok(Box::new(BufReader::with_capacity(
            1 << 16,
            GzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(1 << 16, file)))
    }
}

/// 逐行扫描单个文件，把抽取成功的记录投递给 `sink`。
///
/// 无法抽取的行静默跳过；无效 UTF-8 字节做宽松替换后继续。
/// 返回投递的记录条数。损坏的 gzip 流会在读取途中以 IO 错误返回。
fn scan_file<S: RecordSink>(path: &Path, sink: &S) -> Result<usize> {
    let mut reader = open_reader(path)?;
    let mut buf = Vec::new();
    let mut matched = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(record) = extract_record(&line) {
            sink.accept(&record);
            matched += 1;
        }
    }
    Ok(matched)
}

/// 用 `thread_count` 个工作线程扫描全部文件，所有记录折叠进 `sink`。
///
/// 调用阻塞直到所有线程结束。返回读取失败的文件列表
/// `(文件名, 错误详情)`；失败文件的贡献缺席，但不会中断其余文件。
pub fn scan_files<S: RecordSink>(
    files: &[PathBuf],
    thread_count: usize,
    sink: &S,
) -> Vec<(String, String)> {
    if files.is_empty() {
        return Vec::new();
    }

    let workers = thread_count.max(1).min(files.len());
    tracing::info!("开始扫描 {} 个文件，线程数 {}", files.len(), workers);

    let (task_tx, task_rx) = mpsc::channel::<PathBuf>();
    let task_rx = Arc::new(Mutex::new(task_rx));
    let (err_tx, err_rx) = mpsc::channel::<(String, String)>();

    thread::scope(|scope| {
        for worker_id in 0..workers {
            let task_rx = Arc::clone(&task_rx);
            let err_tx = err_tx.clone();
            scope.spawn(move || {
                loop {
                    // 每次只在取任务时短暂持锁
                    let task = {
                        task_rx.lock().ok().and_then(|rx| rx.recv().ok())
                    };
                    let Some(path) = task else {
                        break;
                    };
                    tracing::trace!(
                        "线程 {worker_id} 开始扫描: {}",
                        path.display()
                    );
                    match scan_file(&path, sink) {
                        Ok(matched) => {
                            tracing::debug!(
                                "线程 {worker_id} 完成 {}，记录 {} 条",
                                path.display(),
                                matched
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                "读取失败: {} -> {e}",
                                path.display()
                            );
                            let name = path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .unwrap_or("unknown")
                                .to_string();
                            let _ = err_tx.send((name, e.to_string()));
                        }
                    }
                }
            });
        }

        for file in files {
            // 接收端只会在所有工作线程退出后关闭，send 不会失败
            let _ = task_tx.send(file.clone());
        }
        drop(task_tx);
    });

    drop(err_tx);
    err_rx.into_iter().collect()
}
