//! 工作簿导出器（Excel 2003 XML）
//!
//! 单文件多 sheet 的 SpreadsheetML 输出：每个报表节一个 Worksheet，
//! 块之间用空行分隔，数据行中形如数字的单元格写为 Number 类型。
//! 不依赖二进制 Excel 库，任何电子表格软件都能直接打开。

use std::io::{BufWriter, Write};
use std::path::Path;

use super::ReportExporter;
use crate::error::Result;
use crate::report::{Block, Report};

/// 工作簿导出器
pub struct WorkbookExporter {
    writer: BufWriter<std::fs::File>,
}

impl WorkbookExporter {
    /// 创建导出器，目标文件被覆盖
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self { writer: BufWriter::new(file) })
    }

    fn write_prolog(&mut self) -> Result<()> {
        self.writer.write_all(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\" ",
                "xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
            )
            .as_bytes(),
        )?;
        Ok(())
    }

    fn write_styles(&mut self) -> Result<()> {
        self.writer.write_all(
            concat!(
                "  <Styles>\n",
                "    <Style ss:ID=\"header\"><Font ss:Bold=\"1\"/>",
                "<Interior ss:Color=\"#D9D9D9\" ss:Pattern=\"Solid\"/></Style>\n",
                "  </Styles>\n",
            )
            .as_bytes(),
        )?;
        Ok(())
    }

    fn write_row(&mut self, cells: &[String], header: bool) -> Result<()> {
        self.writer.write_all(b"      <Row>\n")?;
        for value in cells {
            let style = if header { " ss:StyleID=\"header\"" } else { "" };
            let cell_type =
                if !header && is_numeric(value) { "Number" } else { "String" };
            writeln!(
                self.writer,
                "        <Cell{style}><Data ss:Type=\"{cell_type}\">{}</Data></Cell>",
                xml_escape(value)
            )?;
        }
        self.writer.write_all(b"      </Row>\n")?;
        Ok(())
    }

    fn write_block(&mut self, block: &Block) -> Result<()> {
        self.write_row(&[block.title.clone()], true)?;
        self.write_row(&block.header, true)?;
        for row in &block.rows {
            self.write_row(row, false)?;
        }
        // 块尾空行分隔
        self.writer.write_all(b"      <Row/>\n")?;
        Ok(())
    }
}

impl ReportExporter for WorkbookExporter {
    fn name(&self) -> &str {
        "workbook"
    }

    fn export(&mut self, report: &Report) -> Result<()> {
        self.write_prolog()?;
        self.write_styles()?;

        for section in &report.sections {
            writeln!(
                self.writer,
                "  <Worksheet ss:Name=\"{}\">\n    <Table>",
                xml_escape(&section.name)
            )?;
            for block in &section.blocks {
                self.write_block(block)?;
            }
            self.writer.write_all(b"    </Table>\n  </Worksheet>\n")?;
        }

        self.writer.write_all(b"</Workbook>\n")?;
        self.writer.flush()?;

        tracing::info!("工作簿导出完成，{} 个 sheet", report.sections.len());
        Ok(())
    }
}

/// XML 特殊字符转义
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// 粗略判断单元格内容是否为数字（整数或小数）
fn is_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
}
