use crate::{
    browser::{FetchRequest, Locator, PageFetcher},
    crawler::{
        goodinfo::{self, AD_CLOSE},
        table::{KeyFormat, RowStrategy, TableSchema},
    },
    declare::{MetricKind, MetricTable},
};

/// 切換成 5 年區間的按鈕
const EXPAND_CONTROL: Locator<'static> = Locator::XPath("//input[@value='查5年']");
/// 5 年區間載入後才會出現的列
const EXPAND_LOADED: Locator<'static> = Locator::Css("#row180");

/// 第 1 欄為週別 (YYWnn)，第 6 欄為本益比
const SCHEMA: TableSchema = TableSchema {
    kind: MetricKind::PeRatio,
    rows: RowStrategy::SequentialId {
        count: MetricKind::PeRatio.window(),
    },
    min_columns: 6,
    key_column: 0,
    value_column: 5,
    key_format: KeyFormat::YearWeek,
    window: MetricKind::PeRatio.window(),
};

pub fn url(host: &str, stock_symbol: &str) -> String {
    format!(
        "https://{}/tw/ShowK_ChartFlow.asp?RPT_CAT=PER&STOCK_ID={}",
        host, stock_symbol
    )
}

/// 抓取近 180 週的本益比
pub fn visit<F: PageFetcher + ?Sized>(fetcher: &F, host: &str, stock_symbol: &str) -> MetricTable {
    let url = url(host, stock_symbol);
    let request = FetchRequest::new(&url)
        .ad_close(AD_CLOSE)
        .expand(EXPAND_CONTROL, EXPAND_LOADED);

    goodinfo::fetch_table(fetcher, &request, &SCHEMA, stock_symbol)
}
