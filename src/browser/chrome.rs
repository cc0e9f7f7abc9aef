use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use once_cell::sync::Lazy;

use crate::{
    browser::{FetchRequest, Locator, PageFetcher},
    config,
    crawler::error::CrawlError,
    logging::Logger,
    util::user_agent,
};

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("browser"));

/// 等待瀏覽器的 log 寫完
pub async fn flush_log() {
    LOGGER.flush().await;
}

/// 瀏覽器閒置多久後自動關閉
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(180);

/// 一個 Chrome 行程加上一個分頁
///
/// 由建立它的工作獨佔，離開作用域時關閉分頁並結束行程。
pub struct ChromeSession {
    // tab 必須先於 browser 釋放
    tab: Arc<Tab>,
    _browser: Browser,
    ad_close_timeout: Duration,
    wait_timeout: Duration,
}

impl ChromeSession {
    pub fn launch(config: &config::Browser) -> Result<Self, CrawlError> {
        let ua = if config.user_agent.is_empty() {
            user_agent::gen_random_ua()
        } else {
            config.user_agent.clone()
        };
        let ua_arg = OsString::from(format!("--user-agent={}", ua));
        let args: Vec<&OsStr> = vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-blink-features=AutomationControlled"),
            ua_arg.as_os_str(),
        ];

        let options = LaunchOptions {
            headless: config.headless,
            window_size: Some((config.window_width, config.window_height)),
            path: (!config.chrome_path.is_empty()).then(|| PathBuf::from(&config.chrome_path)),
            idle_browser_timeout: IDLE_BROWSER_TIMEOUT,
            args,
            ..Default::default()
        };

        let browser = Browser::new(options)
            .map_err(|why| CrawlError::BrowserLaunch(format!("{:?}", why)))?;
        let tab = browser
            .new_tab()
            .map_err(|why| CrawlError::BrowserLaunch(format!("Failed to open tab: {:?}", why)))?;

        LOGGER.info(format!("Chrome launched (headless: {})", config.headless));

        Ok(ChromeSession {
            tab,
            _browser: browser,
            ad_close_timeout: Duration::from_secs(config.ad_close_timeout_secs),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        })
    }

    fn wait(&self, locator: Locator<'_>, timeout: Duration) -> anyhow::Result<Element<'_>> {
        match locator {
            Locator::Css(selector) => self
                .tab
                .wait_for_element_with_custom_timeout(selector, timeout),
            Locator::XPath(xpath) => self.tab.wait_for_xpath_with_custom_timeout(xpath, timeout),
        }
    }

    /// 等待必要元素出現
    fn wait_required(&self, url: &str, locator: Locator<'_>) -> Result<Element<'_>, CrawlError> {
        self.wait(locator, self.wait_timeout).map_err(|why| {
            LOGGER.error(format!("Timed out waiting for {} on {}: {:?}", locator, url, why));
            CrawlError::ElementNotFound {
                url: url.to_string(),
                locator: locator.to_string(),
            }
        })
    }

    /// 嘗試關閉廣告插頁，找不到不算錯誤
    fn close_ad(&self, url: &str, locator: Locator<'_>) {
        match self.wait(locator, self.ad_close_timeout) {
            Ok(button) => match button.click() {
                Ok(_) => LOGGER.info(format!("Advertisement closed for {}", url)),
                Err(why) => LOGGER.warn(format!(
                    "Unable to close advertisement for {} because {:?}",
                    url, why
                )),
            },
            Err(_) => LOGGER.info(format!("No advertisement found for {}", url)),
        }
    }
}

impl PageFetcher for ChromeSession {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, CrawlError> {
        let url = request.url;
        let start = Instant::now();

        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|why| CrawlError::Navigation {
                url: url.to_string(),
                reason: format!("{:?}", why),
            })?;

        if let Some(ad_close) = request.ad_close {
            self.close_ad(url, ad_close);
        }

        if let Some(expand) = request.expand {
            self.wait_required(url, expand.control)?
                .click()
                .map_err(|why| CrawlError::Navigation {
                    url: url.to_string(),
                    reason: format!("Failed to click {} because {:?}", expand.control, why),
                })?;
            LOGGER.info(format!("Clicked {} on {}", expand.control, url));
            self.wait_required(url, expand.loaded)?;
        }

        self.wait_required(url, request.wait_for)?;

        let html = self.tab.get_content().map_err(|why| CrawlError::Navigation {
            url: url.to_string(),
            reason: format!("Failed to get page content because {:?}", why),
        })?;

        LOGGER.info(format!(
            "GET:{} {} bytes {} ms",
            url,
            html.len(),
            start.elapsed().as_millis()
        ));

        Ok(html)
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        match self.tab.close(false) {
            Ok(_) => LOGGER.info("Chrome session closed"),
            Err(why) => LOGGER.error(format!("Failed to close chrome tab because {:?}", why)),
        }
    }
}
