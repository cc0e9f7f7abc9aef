use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::{analysis::ValuationReport, config, logging};

/// 儲存格與工作表的配置
pub mod layout;
pub mod xlsx;

/// `{symbol}_stock_data_{%Y%m%d_%H%M%S}.xlsx`，不附加時間時為 `{symbol}_stock_data.xlsx`
pub fn file_name(stock_symbol: &str, timestamp: Option<DateTime<Local>>) -> String {
    match timestamp {
        Some(now) => format!(
            "{}_stock_data_{}.xlsx",
            stock_symbol,
            now.format("%Y%m%d_%H%M%S")
        ),
        None => format!("{}_stock_data.xlsx", stock_symbol),
    }
}

pub fn output_path(setting: &config::Report, stock_symbol: &str, now: DateTime<Local>) -> PathBuf {
    let timestamp = setting.timestamp.then_some(now);
    Path::new(&setting.output_dir).join(file_name(stock_symbol, timestamp))
}

/// 將彙總結果序列化成檔案
pub trait ReportWriter {
    fn write(&self, report: &ValuationReport, path: &Path) -> Result<()>;
}

/// 建立輸出目錄後寫出報表，回傳檔案路徑
pub fn save<W: ReportWriter + ?Sized>(
    writer: &W,
    report: &ValuationReport,
    setting: &config::Report,
) -> Result<PathBuf> {
    let path = output_path(setting, &report.stock_symbol, Local::now());

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    writer
        .write(report, &path)
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    logging::info_file_async(format!("Data saved to {}", path.display()));

    Ok(path)
}
