//! 报表序列化模块
//!
//! 把逻辑报表写成物理文件：Excel 2003 XML 工作簿或平面 CSV。

pub mod csv;
pub mod workbook;

pub use csv::CsvExporter;
pub use workbook::WorkbookExporter;

use crate::error::Result;
use crate::report::Report;

/// 报表导出器的统一接口
pub trait ReportExporter {
    /// 导出器名称（用于日志）
    fn name(&self) -> &str;

    /// 序列化整个报表并落盘
    fn export(&mut self, report: &Report) -> Result<()>;
}
