use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// 抓取的財務指標種類
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum MetricKind {
    /// 月營收
    #[strum(to_string = "Revenue")]
    Revenue,
    /// 年度稅後淨利率
    #[strum(to_string = "Profit Margin")]
    ProfitMargin,
    /// 週本益比
    #[strum(to_string = "PE Ratio")]
    PeRatio,
    /// 目前成交價
    #[strum(to_string = "Current Price")]
    Price,
}

impl MetricKind {
    /// 工作表名稱
    pub fn sheet_name(&self) -> String {
        self.to_string()
    }

    /// 數值欄位的標題
    pub fn value_header(&self) -> &'static str {
        match self {
            MetricKind::Revenue => "Revenue",
            MetricKind::ProfitMargin => "Net Profit Margin",
            MetricKind::PeRatio => "P/E Ratio",
            MetricKind::Price => "Price",
        }
    }

    /// 期間欄位的標題，本益比是以週為單位
    pub fn period_header(&self) -> &'static str {
        match self {
            MetricKind::PeRatio => "Week",
            _ => "Month",
        }
    }

    /// 預期保留的筆數：36 個月、5 年、180 週、1 筆
    pub const fn window(&self) -> usize {
        match self {
            MetricKind::Revenue => 36,
            MetricKind::ProfitMargin => 5,
            MetricKind::PeRatio => 180,
            MetricKind::Price => 1,
        }
    }

    pub fn iterator() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// 網頁表格的時間排序
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RowOrder {
    /// 第一列為最新一期
    #[default]
    NewestFirst,
    /// 最後一列為最新一期
    OldestFirst,
}

/// 表格中的一列資料
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MetricRecord {
    pub year: i32,
    /// 月份 (1~12)，年度資料固定為 12，本益比為週次
    pub period: u32,
    /// 網頁顯示 "-" 或無法解析時為 None
    pub value: Option<f64>,
}

impl MetricRecord {
    pub fn new(year: i32, period: u32, value: Option<f64>) -> Self {
        MetricRecord {
            year,
            period,
            value,
        }
    }
}

/// 同一種指標的資料，順序與網頁上的順序相同
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    pub kind: MetricKind,
    pub records: Vec<MetricRecord>,
}

impl MetricTable {
    pub fn new(kind: MetricKind) -> Self {
        MetricTable {
            kind,
            records: Vec::with_capacity(kind.window()),
        }
    }

    pub fn with_records(kind: MetricKind, records: Vec<MetricRecord>) -> Self {
        MetricTable { kind, records }
    }

    /// 抓不到股價時以目前的年月建立一筆沒有數值的資料
    pub fn unknown_price(now: DateTime<Local>) -> Self {
        Self::with_records(
            MetricKind::Price,
            vec![MetricRecord::new(now.year(), now.month(), None)],
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: MetricRecord) {
        self.records.push(record);
    }

    /// 只保留最後 `window` 筆
    pub fn keep_last(&mut self, window: usize) {
        if self.records.len() > window {
            let excess = self.records.len() - window;
            self.records.drain(..excess);
        }
    }

    /// 有數值的資料
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(|r| r.value)
    }

    /// 依排序取得最新一筆
    pub fn latest(&self, order: RowOrder) -> Option<&MetricRecord> {
        match order {
            RowOrder::NewestFirst => self.records.first(),
            RowOrder::OldestFirst => self.records.last(),
        }
    }

    /// 依排序取得最新的 `n` 筆，筆數不足時回傳 None
    pub fn latest_n(&self, order: RowOrder, n: usize) -> Option<&[MetricRecord]> {
        if self.records.len() < n {
            return None;
        }

        match order {
            RowOrder::NewestFirst => Some(&self.records[..n]),
            RowOrder::OldestFirst => Some(&self.records[self.records.len() - n..]),
        }
    }
}
