use crate::{
    browser::{FetchRequest, Locator, PageFetcher},
    crawler::table::{self, TableLocator, TableSchema},
    declare::{MetricKind, MetricTable},
    logging,
};

/// 每月營收
pub mod revenue;
/// 經營績效 (稅後淨利率)
pub mod profit;
/// 本益比河流圖
pub mod per;
/// 個股即時股價
pub mod price;

pub const HOST: &str = "goodinfo.tw";

/// 進站時的全頁廣告
pub(super) const AD_CLOSE: Locator<'static> =
    Locator::XPath("//button[@id='ats-interstitial-button']");

/// 各頁面的資料表
pub(super) const DETAIL_TABLE: TableLocator<'static> = TableLocator::Id("tblDetail");

/// 依指標種類抓取資料
pub fn visit<F: PageFetcher + ?Sized>(
    fetcher: &F,
    host: &str,
    kind: MetricKind,
    stock_symbol: &str,
) -> MetricTable {
    match kind {
        MetricKind::Revenue => revenue::visit(fetcher, host, stock_symbol),
        MetricKind::ProfitMargin => profit::visit(fetcher, host, stock_symbol),
        MetricKind::PeRatio => per::visit(fetcher, host, stock_symbol),
        MetricKind::Price => price::visit(fetcher, host, stock_symbol),
    }
}

/// 抓取頁面並以指定的欄位配置解析 `#tblDetail`，抓取失敗時回傳空表
pub(super) fn fetch_table<F: PageFetcher + ?Sized>(
    fetcher: &F,
    request: &FetchRequest<'_>,
    schema: &TableSchema,
    stock_symbol: &str,
) -> MetricTable {
    logging::info_file_async(format!("Start to fetch {} data of {}", schema.kind, stock_symbol));

    match fetcher.fetch(request) {
        Ok(html) => table::extract(&html, &DETAIL_TABLE, schema),
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to fetch {} of {} because {}",
                schema.kind, stock_symbol, why
            ));
            MetricTable::new(schema.kind)
        }
    }
}
