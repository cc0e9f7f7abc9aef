use std::fmt;

use crate::crawler::error::CrawlError;

pub mod chrome;
#[cfg(test)]
pub(crate) mod static_page;

/// 頁面元素的定位方式
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
}

impl fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// 點擊「展開區間」的按鈕後，等待另一個代表資料已載入的元素出現
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Expand<'a> {
    pub control: Locator<'a>,
    pub loaded: Locator<'a>,
}

/// 一次頁面抓取的參數
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    /// 必須出現的元素，逾時視為失敗
    pub wait_for: Locator<'a>,
    /// 廣告或插頁的關閉按鈕，找不到時直接略過
    pub ad_close: Option<Locator<'a>>,
    pub expand: Option<Expand<'a>>,
}

impl<'a> FetchRequest<'a> {
    /// 預設等待頁面上出現 `table`
    pub fn new(url: &'a str) -> Self {
        FetchRequest {
            url,
            wait_for: Locator::Css("table"),
            ad_close: None,
            expand: None,
        }
    }

    pub fn ad_close(mut self, locator: Locator<'a>) -> Self {
        self.ad_close = Some(locator);
        self
    }

    pub fn expand(mut self, control: Locator<'a>, loaded: Locator<'a>) -> Self {
        self.expand = Some(Expand { control, loaded });
        self
    }
}

/// 將網址渲染成 HTML 的能力
///
/// 實作通常持有單一瀏覽器分頁，同一時間只能服務一個請求，
/// 不可在並行的工作之間共用。
pub trait PageFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, CrawlError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_builder() {
        let req = FetchRequest::new("https://goodinfo.tw/tw/StockDetail.asp?STOCK_ID=2330")
            .ad_close(Locator::XPath("//button[@id='ats-interstitial-button']"))
            .expand(Locator::XPath("//input[@value='查5年']"), Locator::Css("#row180"));

        assert_eq!(req.wait_for, Locator::Css("table"));
        assert!(req.ad_close.is_some());
        assert_eq!(req.expand.unwrap().loaded.to_string(), "css:#row180");
    }
}
