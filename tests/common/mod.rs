//! 集成测试公共模块

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// 创建测试用的日志文件
pub fn create_test_log(
    dir: &TempDir,
    filename: &str,
    content: &str,
) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// 创建 gzip 压缩的测试日志文件
#[allow(dead_code)]
pub fn create_gzip_log(
    dir: &TempDir,
    filename: &str,
    content: &str,
) -> PathBuf {
    let file_path = dir.path().join(filename);
    let file = fs::File::create(&file_path).expect("Failed to create file");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(content.as_bytes())
        .expect("Failed to write gzip content");
    encoder.finish().expect("Failed to finish gzip stream");
    file_path
}

/// 标准测试日志内容（p6spy 拦截器格式）
#[allow(dead_code)]
pub const SAMPLE_LOG_CONTENT: &str = "\
[Time: 15 ms][Caller: com.a.B#c:10][SQL: select * from orders o join users u on o.uid=u.id]
[Time: 0 ms][Caller: com.a.B#c:10][SQL: select * from orders]
2024-01-01 INFO unrelated application noise
[Time: 8 ms][Caller: com.a.B#c:10][SQL: insert into audit_log (a) values (1)]
";

/// 两行 workbook 端到端最小场景
#[allow(dead_code)]
pub const TWO_LINE_SCENARIO: &str = "\
[Time: 15 ms][Caller: com.a.B#c:10][SQL: select * from orders o join users u on o.uid=u.id]
[Time: 0 ms][Caller: com.a.B#c:10][SQL: select * from orders]
";
