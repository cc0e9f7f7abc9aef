use chrono::{DateTime, Datelike, Local};
use scraper::{Html, Selector};

use crate::{
    browser::{FetchRequest, PageFetcher},
    crawler::{error::CrawlError, goodinfo::AD_CLOSE},
    declare::{MetricKind, MetricRecord, MetricTable},
    logging,
    util::text,
};

/// 個股資訊頁中「成交價」的儲存格
const PRICE_CELL: &str = "body > table:nth-of-type(2) > tbody > tr:nth-of-type(2) > td:nth-of-type(3) \
     > main > table > tbody > tr > td:nth-of-type(1) > section > table > tbody \
     > tr:nth-of-type(3) > td:nth-of-type(1)";

pub fn url(host: &str, stock_symbol: &str) -> String {
    format!("https://{}/tw/StockDetail.asp?STOCK_ID={}", host, stock_symbol)
}

/// 抓取目前成交價，失敗時回傳一筆沒有數值的資料
pub fn visit<F: PageFetcher + ?Sized>(fetcher: &F, host: &str, stock_symbol: &str) -> MetricTable {
    let url = url(host, stock_symbol);
    let request = FetchRequest::new(&url).ad_close(AD_CLOSE);
    let now = Local::now();

    logging::info_file_async(format!("Start to fetch price of {}", stock_symbol));

    let html = match fetcher.fetch(&request) {
        Ok(html) => html,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to fetch price of {} because {}",
                stock_symbol, why
            ));
            return MetricTable::unknown_price(now);
        }
    };

    match extract(&html, &url, now) {
        Ok(table) => table,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to extract price of {} because {}",
                stock_symbol, why
            ));
            MetricTable::unknown_price(now)
        }
    }
}

/// 從個股資訊頁取出成交價
pub fn extract(document: &str, url: &str, now: DateTime<Local>) -> Result<MetricTable, CrawlError> {
    let not_found = || CrawlError::ElementNotFound {
        url: url.to_string(),
        locator: format!("css:{}", PRICE_CELL),
    };

    let selector = Selector::parse(PRICE_CELL).map_err(|_| not_found())?;
    let html = Html::parse_document(document);
    let cell = html.select(&selector).next().ok_or_else(not_found)?;
    let raw = cell.text().collect::<String>();

    let value = text::parse_optional_f64(&raw).map_err(|_| CrawlError::ValueParse {
        row: "price".to_string(),
        text: raw.trim().to_string(),
    })?;

    Ok(MetricTable::with_records(
        MetricKind::Price,
        vec![MetricRecord::new(now.year(), now.month(), value)],
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::{browser::static_page::StaticPage, crawler::goodinfo::HOST};

    use super::*;

    /// 個股資訊頁的巢狀版面，`price` 放在成交價的位置
    fn detail_page(price: &str) -> String {
        format!(
            "<html><body>\
             <table><tbody><tr><td>header</td></tr></tbody></table>\
             <table><tbody>\
               <tr><td>nav</td></tr>\
               <tr><td>left</td><td>menu</td><td><main><table><tbody><tr><td><section>\
                 <table><tbody>\
                   <tr><td>名稱</td></tr>\
                   <tr><th>成交價</th><th>昨收</th></tr>\
                   <tr><td>{}</td><td>1,070</td></tr>\
                 </tbody></table>\
               </section></td></tr></tbody></table></main></td></tr>\
             </tbody></table>\
             </body></html>",
            price
        )
    }

    #[test]
    fn test_extract() {
        let now = Local.with_ymd_and_hms(2025, 3, 14, 13, 30, 0).unwrap();

        let table = extract(&detail_page("1,085"), "https://goodinfo.tw", now).unwrap();

        assert_eq!(table.kind, MetricKind::Price);
        assert_eq!(table.records, vec![MetricRecord::new(2025, 3, Some(1085.0))]);
    }

    #[test]
    fn test_extract_missing_cell() {
        let now = Local.with_ymd_and_hms(2025, 3, 14, 13, 30, 0).unwrap();

        let result = extract("<html><body><table></table></body></html>", "u", now);

        assert!(matches!(result, Err(CrawlError::ElementNotFound { .. })));
    }

    #[test]
    fn test_extract_bad_value() {
        let now = Local.with_ymd_and_hms(2025, 3, 14, 13, 30, 0).unwrap();

        let result = extract(&detail_page("暫停交易"), "u", now);

        assert!(matches!(result, Err(CrawlError::ValueParse { .. })));
    }

    #[test]
    fn test_visit() {
        let page = StaticPage::new().with_page(&url(HOST, "2330"), &detail_page("1,085.5"));

        let table = visit(&page, HOST, "2330");

        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].value, Some(1085.5));
        assert!(page.requests()[0].ad_close);
    }

    #[test]
    fn test_visit_falls_back_to_unknown_price() {
        let page = StaticPage::new();

        let table = visit(&page, HOST, "2330");

        assert_eq!(table.kind, MetricKind::Price);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].value, None);
        assert_eq!(table.records[0].year, Local::now().year());
    }
}
