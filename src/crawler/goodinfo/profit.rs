use crate::{
    browser::{FetchRequest, PageFetcher},
    crawler::{
        goodinfo::{self, AD_CLOSE},
        table::{KeyFormat, RowStrategy, TableSchema},
    },
    declare::{MetricKind, MetricTable},
    logging,
};

/// 第 1 欄為年度，第 16 欄為稅後淨利率
const SCHEMA: TableSchema = TableSchema {
    kind: MetricKind::ProfitMargin,
    rows: RowStrategy::AllRows {
        skip_header_rows: 0,
    },
    min_columns: 16,
    key_column: 0,
    value_column: 15,
    key_format: KeyFormat::Year,
    window: MetricKind::ProfitMargin.window(),
};

pub fn url(host: &str, stock_symbol: &str) -> String {
    format!(
        "https://{}/tw/StockBzPerformance.asp?STOCK_ID={}",
        host, stock_symbol
    )
}

/// 抓取近 5 年的稅後淨利率
pub fn visit<F: PageFetcher + ?Sized>(fetcher: &F, host: &str, stock_symbol: &str) -> MetricTable {
    let url = url(host, stock_symbol);
    let request = FetchRequest::new(&url).ad_close(AD_CLOSE);
    let table = goodinfo::fetch_table(fetcher, &request, &SCHEMA, stock_symbol);

    if table.is_empty() {
        logging::warn_file_async(format!(
            "No profit margin rows parsed for {}",
            stock_symbol
        ));
    } else if table.len() < SCHEMA.window {
        logging::warn_file_async(format!(
            "Only {} years of profit margin found for {}, expected {}",
            table.len(),
            stock_symbol,
            SCHEMA.window
        ));
    }

    table
}

#[cfg(test)]
mod tests {
    use crate::{
        browser::static_page::StaticPage,
        crawler::goodinfo::{fixture, HOST},
        declare::MetricRecord,
    };

    use super::*;

    #[test]
    fn test_visit() {
        let rows = vec![
            fixture::row(20, "2025Q3", 15, "43.1"),
            fixture::row(20, "2024", 15, "40.52"),
            fixture::row(20, "2023", 15, "38.77"),
            fixture::row(20, "年度", 15, "稅後淨利率"),
            fixture::row(20, "2022", 15, "44.92"),
            fixture::row(20, "2021", 15, "37.58"),
            fixture::row(20, "2020", 15, "38.66"),
            fixture::row(10, "2019", 15, "32.27"),
        ];
        let page = StaticPage::new().with_page(&url(HOST, "2330"), &fixture::detail_table(&rows));

        let table = visit(&page, HOST, "2330");

        assert_eq!(table.kind, MetricKind::ProfitMargin);
        // 6 筆有效資料只保留最後 5 筆，期間固定為 12
        assert_eq!(
            table.records,
            vec![
                MetricRecord::new(2024, 12, Some(40.52)),
                MetricRecord::new(2023, 12, Some(38.77)),
                MetricRecord::new(2022, 12, Some(44.92)),
                MetricRecord::new(2021, 12, Some(37.58)),
                MetricRecord::new(2020, 12, Some(38.66)),
            ]
        );
        assert!(page.requests()[0].ad_close);
    }

    #[test]
    fn test_visit_keeps_placeholder_years() {
        let rows = vec![
            fixture::row(16, "2024", 15, "-"),
            fixture::row(16, "2023", 15, "12.5%"),
        ];
        let page = StaticPage::new().with_page(&url(HOST, "6488"), &fixture::detail_table(&rows));

        let table = visit(&page, HOST, "6488");

        assert_eq!(
            table.records,
            vec![
                MetricRecord::new(2024, 12, None),
                MetricRecord::new(2023, 12, Some(12.5)),
            ]
        );
    }

    #[test]
    fn test_visit_without_table() {
        let page = StaticPage::new().with_page(
            &url(HOST, "2330"),
            "<html><body><table id='other'><tr><td>2024</td></tr></table></body></html>",
        );

        let table = visit(&page, HOST, "2330");

        assert!(table.is_empty());
    }
}
