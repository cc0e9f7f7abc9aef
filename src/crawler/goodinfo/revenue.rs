use crate::{
    browser::{FetchRequest, PageFetcher},
    crawler::{
        goodinfo::{self, AD_CLOSE},
        table::{KeyFormat, RowStrategy, TableSchema},
    },
    declare::{MetricKind, MetricTable},
};

/// 第 1 欄為年月，第 8 欄為單月營收
const SCHEMA: TableSchema = TableSchema {
    kind: MetricKind::Revenue,
    rows: RowStrategy::SequentialId {
        count: MetricKind::Revenue.window(),
    },
    min_columns: 8,
    key_column: 0,
    value_column: 7,
    key_format: KeyFormat::YearMonth,
    window: MetricKind::Revenue.window(),
};

pub fn url(host: &str, stock_symbol: &str) -> String {
    format!(
        "https://{}/tw/ShowSaleMonChart.asp?STOCK_ID={}",
        host, stock_symbol
    )
}

/// 抓取近 36 個月的營收
pub fn visit<F: PageFetcher + ?Sized>(fetcher: &F, host: &str, stock_symbol: &str) -> MetricTable {
    let url = url(host, stock_symbol);
    let request = FetchRequest::new(&url).ad_close(AD_CLOSE);

    goodinfo::fetch_table(fetcher, &request, &SCHEMA, stock_symbol)
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
            fixture::row(21, "2025/02", 7, "2,600,967"),
            fixture::row(21, "2025/01", 7, "2,932,924"),
            fixture::row(5, "2024/12", 7, "1"),
            fixture::row(21, "2024/11", 7, "-"),
        ];
        let page = StaticPage::new().with_page(&url(HOST, "2330"), &fixture::detail_table(&rows));

        let table = visit(&page, HOST, "2330");

        assert_eq!(table.kind, MetricKind::Revenue);
        assert_eq!(
            table.records,
            vec![
                MetricRecord::new(2025, 2, Some(2600967.0)),
                MetricRecord::new(2025, 1, Some(2932924.0)),
                MetricRecord::new(2024, 11, None),
            ]
        );

        let requests = page.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].ad_close);
        assert_eq!(requests[0].wait_for, "css:table");
        assert!(requests[0].expand.is_none());
    }

    #[test]
    fn test_visit_keeps_36_months() {
        let rows: Vec<Vec<String>> = (0..40)
            .map(|i| fixture::row(8, &format!("{}/{:02}", 2022 + i / 12, i % 12 + 1), 7, "100"))
            .collect();
        let page = StaticPage::new().with_page(&url(HOST, "2330"), &fixture::detail_table(&rows));

        let table = visit(&page, HOST, "2330");

        assert_eq!(table.len(), 36);
        assert_eq!(table.records[0], MetricRecord::new(2022, 1, Some(100.0)));
    }

    #[test]
    fn test_visit_fetch_failure_is_empty() {
        let page = StaticPage::new();

        let table = visit(&page, HOST, "2330");

        assert!(table.is_empty());
        assert_eq!(table.kind, MetricKind::Revenue);
    }
}
