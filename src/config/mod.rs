use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{crawler::goodinfo, declare::RowOrder, logging};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub browser: Browser,
    #[serde(default)]
    pub crawler: Crawler,
    #[serde(default)]
    pub valuation: Valuation,
    #[serde(default)]
    pub report: Report,
}

const BROWSER_HEADLESS: &str = "BROWSER_HEADLESS";
const BROWSER_CHROME_PATH: &str = "BROWSER_CHROME_PATH";
const BROWSER_USER_AGENT: &str = "BROWSER_USER_AGENT";
const BROWSER_AD_CLOSE_TIMEOUT_SECS: &str = "BROWSER_AD_CLOSE_TIMEOUT_SECS";
const BROWSER_WAIT_TIMEOUT_SECS: &str = "BROWSER_WAIT_TIMEOUT_SECS";

/// 瀏覽器啟動設定，由建構 `ChromeSession` 時帶入
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Browser {
    /// false 時會開出可見的視窗，除錯用
    #[serde(default = "default_true")]
    pub headless: bool,
    /// 空字串時由 headless_chrome 自行尋找 Chrome
    #[serde(default)]
    pub chrome_path: String,
    /// 空字串時隨機產生
    #[serde(default)]
    pub user_agent: String,
    #[serde(default = "default_ad_close_timeout_secs")]
    pub ad_close_timeout_secs: u64,
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

impl Default for Browser {
    fn default() -> Self {
        Browser {
            headless: true,
            chrome_path: String::new(),
            user_agent: String::new(),
            ad_close_timeout_secs: default_ad_close_timeout_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

const CRAWLER_HOST: &str = "CRAWLER_HOST";
const CRAWLER_MAX_WORKERS: &str = "CRAWLER_MAX_WORKERS";
const CRAWLER_ROW_ORDER: &str = "CRAWLER_ROW_ORDER";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Crawler {
    #[serde(default = "default_host")]
    pub host: String,
    /// 同時開啟的瀏覽器數量上限
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// 網頁表格的時間排序，決定「最新」取頭還是取尾
    #[serde(default)]
    pub row_order: RowOrder,
}

impl Default for Crawler {
    fn default() -> Self {
        Crawler {
            host: default_host(),
            max_workers: default_max_workers(),
            row_order: RowOrder::default(),
        }
    }
}

const VALUATION_REVENUE_SCALE: &str = "VALUATION_REVENUE_SCALE";
const VALUATION_SHARE_COUNT: &str = "VALUATION_SHARE_COUNT";

/// 預估股價公式的常數
///
/// `近12月營收合計 * revenue_scale * (淨利率 / 100) / share_count * 本益比`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Valuation {
    #[serde(default = "default_revenue_scale")]
    pub revenue_scale: f64,
    #[serde(default = "default_share_count")]
    pub share_count: f64,
}

impl Default for Valuation {
    fn default() -> Self {
        Valuation {
            revenue_scale: default_revenue_scale(),
            share_count: default_share_count(),
        }
    }
}

const REPORT_OUTPUT_DIR: &str = "REPORT_OUTPUT_DIR";
const REPORT_TIMESTAMP: &str = "REPORT_TIMESTAMP";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Report {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// 檔名是否附加產生時間
    #[serde(default = "default_true")]
    pub timestamp: bool,
}

impl Default for Report {
    fn default() -> Self {
        Report {
            output_dir: default_output_dir(),
            timestamp: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ad_close_timeout_secs() -> u64 {
    10
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_host() -> String {
    goodinfo::HOST.to_string()
}

fn default_max_workers() -> usize {
    5
}

fn default_revenue_scale() -> f64 {
    10.0
}

fn default_share_count() -> f64 {
    2593.0
}

fn default_output_dir() -> String {
    "output".to_string()
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| match App::get() {
    Ok(app) => app,
    Err(why) => {
        logging::error_file_async(format!(
            "I can't read the config context because {:?}",
            why
        ));
        App::from_env()
    }
});

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::from_env())
    }

    /// 沒有設定檔時以預設值為底，再套用 env
    fn from_env() -> Self {
        App::default().override_with_env()
    }

    /// 將來自於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Some(headless) = env_parse::<bool>(BROWSER_HEADLESS) {
            self.browser.headless = headless;
        }

        if let Ok(path) = env::var(BROWSER_CHROME_PATH) {
            self.browser.chrome_path = path;
        }

        if let Ok(ua) = env::var(BROWSER_USER_AGENT) {
            self.browser.user_agent = ua;
        }

        if let Some(secs) = env_parse::<u64>(BROWSER_AD_CLOSE_TIMEOUT_SECS) {
            self.browser.ad_close_timeout_secs = secs;
        }

        if let Some(secs) = env_parse::<u64>(BROWSER_WAIT_TIMEOUT_SECS) {
            self.browser.wait_timeout_secs = secs;
        }

        if let Ok(host) = env::var(CRAWLER_HOST) {
            self.crawler.host = host;
        }

        if let Some(workers) = env_parse::<usize>(CRAWLER_MAX_WORKERS) {
            self.crawler.max_workers = workers;
        }

        if let Some(order) = env_parse::<RowOrder>(CRAWLER_ROW_ORDER) {
            self.crawler.row_order = order;
        }

        if let Some(scale) = env_parse::<f64>(VALUATION_REVENUE_SCALE) {
            self.valuation.revenue_scale = scale;
        }

        if let Some(share) = env_parse::<f64>(VALUATION_SHARE_COUNT) {
            self.valuation.share_count = share;
        }

        if let Ok(dir) = env::var(REPORT_OUTPUT_DIR) {
            self.report.output_dir = dir;
        }

        if let Some(timestamp) = env_parse::<bool>(REPORT_TIMESTAMP) {
            self.report.timestamp = timestamp;
        }

        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| T::from_str(v.trim()).ok())
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_json() {
        let app: App = serde_json::from_str(r#"{"browser":{"headless":false}}"#).unwrap();

        assert!(!app.browser.headless);
        assert_eq!(app.browser.wait_timeout_secs, 10);
        assert_eq!(app.crawler.host, "goodinfo.tw");
        assert_eq!(app.crawler.max_workers, 5);
        assert_eq!(app.crawler.row_order, RowOrder::NewestFirst);
        assert_eq!(app.valuation.share_count, 2593.0);
        assert_eq!(app.report.output_dir, "output");
        assert!(app.report.timestamp);
    }

    #[test]
    fn test_row_order_from_json() {
        let app: App =
            serde_json::from_str(r#"{"crawler":{"row_order":"oldest_first"}}"#).unwrap();

        assert_eq!(app.crawler.row_order, RowOrder::OldestFirst);
    }

    #[tokio::test]
    async fn test_settings() {
        dotenv::dotenv().ok();
        logging::debug_file_async(format!("SETTINGS: {:?}", SETTINGS.clone()));
    }
}
