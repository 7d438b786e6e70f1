//! CSV 导出器（legacy stats / where 报表）
//!
//! 平面输出：每个块写一行表头加数据行，不写块标题。
//! 字段内的 CR/LF 压扁为空格，含逗号或引号的字段加引号转义。

use std::io::{BufWriter, Write};
use std::path::Path;

use super::ReportExporter;
use crate::error::Result;
use crate::report::Report;

/// CSV 导出器
pub struct CsvExporter {
    writer: BufWriter<std::fs::File>,
}

impl CsvExporter {
    /// 创建导出器，目标文件被覆盖
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self { writer: BufWriter::new(file) })
    }

    /// 转义单个 CSV 字段
    fn escape_field(field: &str) -> String {
        let flat = field.replace('\r', " ").replace('\n', " ");
        if flat.contains(',') || flat.contains('"') {
            format!("\"{}\"", flat.replace('"', "\"\""))
        } else {
            flat
        }
    }

    fn write_line(&mut self, cells: &[String]) -> Result<()> {
        let line = cells
            .iter()
            .map(|c| Self::escape_field(c))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{line}")?;
        Ok(())
    }
}

impl ReportExporter for CsvExporter {
    fn name(&self) -> &str {
        "csv"
    }

    fn export(&mut self, report: &Report) -> Result<()> {
        let mut rows_written = 0usize;
        for section in &report.sections {
            for block in &section.blocks {
                self.write_line(&block.header)?;
                for row in &block.rows {
                    self.write_line(row)?;
                    rows_written += 1;
                }
            }
        }
        self.writer.flush()?;

        tracing::info!("CSV 导出完成，{} 行数据", rows_written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Block, Section};
    use tempfile::TempDir;

    #[test]
    fn test_escape_field() {
        assert_eq!(CsvExporter::escape_field("simple"), "simple");
        assert_eq!(CsvExporter::escape_field("a,b"), "\"a,b\"");
        assert_eq!(CsvExporter::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(CsvExporter::escape_field("line\nbreak"), "line break");
    }

    #[test]
    fn test_export_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.csv");

        let report = Report {
            sections: vec![Section {
                name: "stats".to_string(),
                blocks: vec![Block {
                    title: "stats".to_string(),
                    header: vec![
                        "caller".to_string(),
                        "count".to_string(),
                        "avg_ms".to_string(),
                    ],
                    rows: vec![vec![
                        "a.B#c:1".to_string(),
                        "3".to_string(),
                        "5.000".to_string(),
                    ]],
                }],
            }],
        };

        let mut exporter = CsvExporter::new(&path).unwrap();
        exporter.export(&report).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "caller,count,avg_ms\na.B#c:1,3,5.000\n");
    }
}
