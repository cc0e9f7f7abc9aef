use std::{process, time::Duration};

use clap::{error::ErrorKind, Parser};

pub mod analysis;
pub mod browser;
pub mod calculation;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod logging;
pub mod report;
pub mod util;

/// 結束前等待 log 寫入檔案的上限
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// 從股市資訊網抓取營收、淨利率、本益比與股價，估算合理股價並輸出 xlsx
#[derive(Parser, Debug)]
#[command(name = "stock_valuation", version)]
struct Cli {
    /// 股票代號，例如 2330
    #[arg(value_name = "STOCK_SYMBOL")]
    stock_symbol: String,

    /// 顯示瀏覽器視窗
    #[arg(long)]
    headed: bool,

    /// 報表輸出目錄
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,
}

impl Cli {
    fn apply(&self, mut settings: config::App) -> config::App {
        if self.headed {
            settings.browser.headless = false;
        }

        if let Some(dir) = &self.output_dir {
            settings.report.output_dir = dir.clone();
        }

        settings
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(why) => {
            let _ = why.print();
            match why.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(1),
            }
        }
    };

    let settings = cli.apply(config::SETTINGS.clone());
    let stock_symbol = cli.stock_symbol.trim();

    match serde_json::to_string(&settings) {
        Ok(json) => logging::debug_file_async(format!("settings: {}", json)),
        Err(why) => {
            logging::error_file_async(format!("Failed to serialize settings because {:?}", why))
        }
    }
    logging::info_file_async(format!("Start valuation of {}", stock_symbol));
    logging::info_console(format!("Fetching data of {} ...", stock_symbol));

    let valuation = analysis::collect(&settings, stock_symbol).await;

    match report::save(&report::xlsx::XlsxWriter, &valuation, &settings.report) {
        Ok(path) => logging::info_console(format!("Data saved to {}", path.display())),
        Err(why) => {
            logging::error_file_async(format!("Failed to save report because {:?}", why));
            logging::error_console(format!("Failed to save report because {:?}", why));
        }
    }

    let flushed = tokio::time::timeout(LOG_FLUSH_TIMEOUT, async {
        logging::flush_file_async().await;
        browser::chrome::flush_log().await;
    })
    .await;
    if flushed.is_err() {
        logging::error_console("Timed out flushing log files");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from(["stock_valuation", "2330", "--headed", "--output-dir", "reports"])
            .unwrap();

        let settings = cli.apply(config::App::default());

        assert_eq!(cli.stock_symbol, "2330");
        assert!(!settings.browser.headless);
        assert_eq!(settings.report.output_dir, "reports");
    }

    #[test]
    fn test_cli_requires_symbol() {
        let err = Cli::try_parse_from(["stock_valuation"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
