use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    crawler::error::CrawlError,
    declare::{MetricKind, MetricRecord, MetricTable},
    logging,
    util::{datetime, text},
};

lazy_static! {
    static ref YEAR_MONTH_RE: Regex = Regex::new(r"^(\d{4})/(\d{2})").unwrap();
    // 只比對開頭的年度，"2025Q3" 這類未滿一年的列也視為該年度
    static ref YEAR_RE: Regex = Regex::new(r"^(\d{4})").unwrap();
    static ref YEAR_WEEK_RE: Regex = Regex::new(r"^(\d{2})W(\d{1,2})").unwrap();
    static ref TR: Selector = Selector::parse("tr").unwrap();
    static ref TD: Selector = Selector::parse("td").unwrap();
}

/// 以 id 或 class 指定頁面上的表格
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableLocator<'a> {
    Id(&'a str),
    Class(&'a str),
}

impl TableLocator<'_> {
    fn css(&self) -> String {
        match self {
            TableLocator::Id(id) => format!("table[id='{}']", id),
            TableLocator::Class(class) => format!("table.{}", class),
        }
    }
}

impl fmt::Display for TableLocator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableLocator::Id(id) => write!(f, "#{}", id),
            TableLocator::Class(class) => write!(f, ".{}", class),
        }
    }
}

/// 逐列讀取的方式
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RowStrategy {
    /// 依序找 `tr#row0` ~ `tr#row{count-1}`，缺少任何一個 id 就停止
    SequentialId { count: usize },
    /// 略過表頭後讀取所有 `tr`
    AllRows { skip_header_rows: usize },
}

/// 主鍵欄位（日期、年度、週次）的格式
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyFormat {
    /// `YYYY/MM`
    YearMonth,
    /// `YYYY`，期間固定為 12 月
    Year,
    /// `YYWnn`，例如 `25W13`
    YearWeek,
}

impl KeyFormat {
    /// 解析出 (年, 期間)，格式不符時回傳 None
    pub fn parse(&self, key: &str) -> Option<(i32, u32)> {
        match self {
            KeyFormat::YearMonth => {
                let caps = YEAR_MONTH_RE.captures(key)?;
                let year = text::parse_i32(&caps[1], None).ok()?;
                let month = text::parse_u32(&caps[2], None).ok()?;
                datetime::is_valid_month(month).then_some((year, month))
            }
            KeyFormat::Year => {
                let caps = YEAR_RE.captures(key)?;
                Some((text::parse_i32(&caps[1], None).ok()?, 12))
            }
            KeyFormat::YearWeek => {
                let caps = YEAR_WEEK_RE.captures(key)?;
                let year = datetime::two_digit_year_to_gregorian(text::parse_i32(&caps[1], None).ok()?);
                let week = text::parse_u32(&caps[2], None).ok()?;
                datetime::is_valid_week(week).then_some((year, week))
            }
        }
    }
}

/// 一種指標在表格上的欄位配置
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub kind: MetricKind,
    pub rows: RowStrategy,
    /// 每列至少要有的 `td` 數量
    pub min_columns: usize,
    pub key_column: usize,
    pub value_column: usize,
    pub key_format: KeyFormat,
    /// 超過時只保留最後的筆數
    pub window: usize,
}

/// 從渲染後的 HTML 取出表格資料
///
/// 找不到表格時回傳空表；格式不符的列會記錄後略過，不影響後續的列。
pub fn extract(document: &str, locator: &TableLocator<'_>, schema: &TableSchema) -> MetricTable {
    let mut table = MetricTable::new(schema.kind);
    let html = Html::parse_document(document);

    let selector = match Selector::parse(&locator.css()) {
        Ok(s) => s,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to Selector::parse({}) because: {:?}",
                locator, why
            ));
            return table;
        }
    };

    let Some(element) = html.select(&selector).next() else {
        logging::warn_file_async(format!(
            "{} ({})",
            CrawlError::TableNotFound(locator.to_string()),
            schema.kind
        ));
        return table;
    };

    match schema.rows {
        RowStrategy::SequentialId { count } => {
            for i in 0..count {
                let id = format!("row{}", i);
                let Some(row) = find_row_by_id(element, &id) else {
                    logging::info_file_async(format!("{} not found in {}", id, schema.kind));
                    break;
                };

                if let Some(record) = parse_row(row, &id, schema) {
                    table.push(record);
                }
            }
        }
        RowStrategy::AllRows { skip_header_rows } => {
            let rows = element
                .select(&TR)
                .filter(|row| belongs_to(*row, element))
                .skip(skip_header_rows);
            for (i, row) in rows.enumerate() {
                let label = format!("tr[{}]", i + skip_header_rows);
                if let Some(record) = parse_row(row, &label, schema) {
                    table.push(record);
                }
            }
        }
    }

    table.keep_last(schema.window);
    table
}

fn find_row_by_id<'a>(table: ElementRef<'a>, id: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&format!("tr[id='{}']", id)).ok()?;
    table.select(&selector).find(|row| belongs_to(*row, table))
}

/// 列的最近一層 `table` 是否就是目標表格，排除巢狀表格裡的列
fn belongs_to(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
        .is_some_and(|owner| owner == table)
}

fn parse_row(row: ElementRef<'_>, label: &str, schema: &TableSchema) -> Option<MetricRecord> {
    let tds: Vec<String> = row
        .select(&TD)
        .map(|td| td.text().collect::<String>().trim().to_string())
        .collect();

    if tds.len() < schema.min_columns {
        return None;
    }

    let key = tds.get(schema.key_column)?;
    let Some((year, period)) = schema.key_format.parse(key) else {
        logging::warn_file_async(
            CrawlError::RowFormatMismatch {
                row: label.to_string(),
                text: key.to_string(),
            }
            .to_string(),
        );
        return None;
    };

    let raw = tds.get(schema.value_column).map(String::as_str).unwrap_or("");
    let value = match text::parse_optional_f64(raw) {
        Ok(v) => v,
        Err(_) => {
            logging::warn_file_async(
                CrawlError::ValueParse {
                    row: label.to_string(),
                    text: raw.to_string(),
                }
                .to_string(),
            );
            None
        }
    };

    Some(MetricRecord::new(year, period, value))
}
