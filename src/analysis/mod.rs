use std::sync::Arc;

use chrono::Local;
use futures::future::join_all;
use scopeguard::defer;
use tokio::{sync::Semaphore, task};

use crate::{
    browser::{chrome::ChromeSession, PageFetcher},
    calculation::{summary::SummaryStats, valuation::ValuationGrid},
    config,
    crawler::{error::CrawlError, goodinfo},
    declare::{MetricKind, MetricTable, RowOrder},
    logging,
};

/// 近 12 個月
const REVENUE_SUM_MONTHS: usize = 12;

/// 四種指標的原始資料
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub revenue: MetricTable,
    pub profit_margin: MetricTable,
    pub pe_ratio: MetricTable,
    pub price: MetricTable,
}

impl Metrics {
    fn from_tables(tables: Vec<MetricTable>) -> Self {
        let mut metrics = Metrics {
            revenue: MetricTable::new(MetricKind::Revenue),
            profit_margin: MetricTable::new(MetricKind::ProfitMargin),
            pe_ratio: MetricTable::new(MetricKind::PeRatio),
            price: MetricTable::unknown_price(Local::now()),
        };

        for table in tables {
            match table.kind {
                MetricKind::Revenue => metrics.revenue = table,
                MetricKind::ProfitMargin => metrics.profit_margin = table,
                MetricKind::PeRatio => metrics.pe_ratio = table,
                MetricKind::Price => metrics.price = table,
            }
        }

        metrics
    }

    /// 依工作表順序
    pub fn tables(&self) -> [&MetricTable; 4] {
        [&self.revenue, &self.profit_margin, &self.pe_ratio, &self.price]
    }
}

/// 交給報表輸出的彙總結果
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationReport {
    pub stock_symbol: String,
    pub metrics: Metrics,
    pub current_price: Option<f64>,
    pub latest_pe: Option<f64>,
    pub pe_stats: Option<SummaryStats>,
    pub profit_stats: Option<SummaryStats>,
    /// 近 12 個月營收合計
    pub revenue_sum: Option<f64>,
    pub grid: Option<ValuationGrid>,
    /// 產生報表時記錄公式用
    pub profile: config::Valuation,
}

impl ValuationReport {
    pub fn build(
        stock_symbol: &str,
        metrics: Metrics,
        order: RowOrder,
        profile: &config::Valuation,
    ) -> Self {
        let current_price = metrics.price.records.first().and_then(|r| r.value);
        let latest_pe = metrics.pe_ratio.latest(order).and_then(|r| r.value);
        let pe_stats = SummaryStats::from_table(&metrics.pe_ratio);
        let profit_stats = SummaryStats::from_table(&metrics.profit_margin);
        let revenue_sum = latest_revenue_sum(&metrics.revenue, order);
        let grid = ValuationGrid::compute(
            revenue_sum,
            profit_stats.as_ref(),
            pe_stats.as_ref(),
            profile,
        );

        if grid.is_none() {
            logging::warn_file_async(format!(
                "Price prediction of {} skipped because revenue, profit margin or P/E is missing",
                stock_symbol
            ));
        }

        ValuationReport {
            stock_symbol: stock_symbol.to_string(),
            metrics,
            current_price,
            latest_pe,
            pe_stats,
            profit_stats,
            revenue_sum,
            grid,
            profile: profile.clone(),
        }
    }
}

/// 最新 12 個月營收的合計，不足 12 個月或全部缺值時為 None
pub fn latest_revenue_sum(revenue: &MetricTable, order: RowOrder) -> Option<f64> {
    let Some(records) = revenue.latest_n(order, REVENUE_SUM_MONTHS) else {
        logging::warn_file_async(format!(
            "Insufficient revenue data for the last {} months, only {} found",
            REVENUE_SUM_MONTHS,
            revenue.len()
        ));
        return None;
    };

    let values: Vec<f64> = records.iter().filter_map(|r| r.value).collect();
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum())
}

/// 以 Chrome 抓取四種指標後彙總
pub async fn collect(settings: &config::App, stock_symbol: &str) -> ValuationReport {
    let browser = settings.browser.clone();
    let metrics = fetch_all(
        move || ChromeSession::launch(&browser),
        &settings.crawler.host,
        stock_symbol,
        settings.crawler.max_workers,
    )
    .await;

    ValuationReport::build(
        stock_symbol,
        metrics,
        settings.crawler.row_order,
        &settings.valuation,
    )
}

/// 同時抓取四種指標
///
/// 每個工作先取得 worker 名額，再以 `launch` 建立自己的頁面抓取器，
/// 抓取器在工作結束時釋放。等待全部工作完成，不因單一失敗而中斷。
pub async fn fetch_all<L, P>(
    launch: L,
    host: &str,
    stock_symbol: &str,
    max_workers: usize,
) -> Metrics
where
    L: Fn() -> Result<P, CrawlError> + Send + Sync + 'static,
    P: PageFetcher + 'static,
{
    let launch = Arc::new(launch);
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));

    let tasks = MetricKind::iterator().map(|kind| {
        let launch = Arc::clone(&launch);
        let semaphore = Arc::clone(&semaphore);
        let host = host.to_string();
        let stock_symbol = stock_symbol.to_string();

        async move {
            let permit = semaphore.acquire_owned().await.ok();
            let handle = task::spawn_blocking(move || {
                let _permit = permit;
                run(launch.as_ref(), &host, kind, &stock_symbol)
            });

            match handle.await {
                Ok(table) => table,
                Err(why) => {
                    logging::error_file_async(format!(
                        "Failed to join {} task because {:?}",
                        kind, why
                    ));
                    missing(kind)
                }
            }
        }
    });

    Metrics::from_tables(join_all(tasks).await)
}

fn run<L, P>(launch: &L, host: &str, kind: MetricKind, stock_symbol: &str) -> MetricTable
where
    L: Fn() -> Result<P, CrawlError>,
    P: PageFetcher,
{
    logging::info_file_async(format!("抓取 {} {} 開始", stock_symbol, kind));
    defer! {
        logging::info_file_async(format!("抓取 {} {} 結束", stock_symbol, kind));
    }

    match launch() {
        Ok(fetcher) => goodinfo::visit(&fetcher, host, kind, stock_symbol),
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to start {} task of {} because {}",
                kind, stock_symbol, why
            ));
            missing(kind)
        }
    }
}

/// 抓取失敗時的資料
fn missing(kind: MetricKind) -> MetricTable {
    match kind {
        MetricKind::Price => MetricTable::unknown_price(Local::now()),
        _ => MetricTable::new(kind),
    }
}
