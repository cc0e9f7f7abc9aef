//! Error types for the crawling pipeline.

/// 抓取流程中可能發生的錯誤，發生處記錄後一律轉成「缺資料」
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Navigation failed: {url} because {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {locator} on {url}")]
    ElementNotFound { url: String, locator: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid row format in {row}: '{text}'")]
    RowFormatMismatch { row: String, text: String },

    #[error("Failed to parse value '{text}' in {row}")]
    ValueParse { row: String, text: String },
}
