use std::sync::Mutex;

use hashbrown::HashMap;

use crate::{
    browser::{FetchRequest, PageFetcher},
    crawler::error::CrawlError,
};

/// 測試用的固定頁面，以網址對應 HTML
#[derive(Default)]
pub struct StaticPage {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub wait_for: String,
    pub ad_close: bool,
    pub expand: Option<(String, String)>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PageFetcher for StaticPage {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, CrawlError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                url: request.url.to_string(),
                wait_for: request.wait_for.to_string(),
                ad_close: request.ad_close.is_some(),
                expand: request
                    .expand
                    .map(|e| (e.control.to_string(), e.loaded.to_string())),
            });
        }

        self.pages
            .get(request.url)
            .cloned()
            .ok_or_else(|| CrawlError::Navigation {
                url: request.url.to_string(),
                reason: "page not found".to_string(),
            })
    }
}
