use crate::{
    analysis::ValuationReport,
    calculation::summary::SummaryStats,
    declare::{MetricKind, MetricTable},
};

pub const SUMMARY_SHEET: &str = "Summary";

/// 儲存格內容，數值一定是有限值，其餘一律留白
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// 顯示到小數第二位
    Rounded(f64),
    Blank,
}

impl Cell {
    pub fn text<S: Into<String>>(s: S) -> Self {
        Cell::Text(s.into())
    }

    pub fn number(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Blank,
        }
    }

    pub fn rounded(value: f64) -> Self {
        if value.is_finite() {
            Cell::Rounded(value)
        } else {
            Cell::Blank
        }
    }
}

/// Summary 工作表的列樣式
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RowStyle {
    /// 深藍底白字
    Title,
    /// 第一欄淺藍底粗體
    Label,
    Spacer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub style: RowStyle,
    pub cells: Vec<Cell>,
}

impl Row {
    fn title<S: Into<String>>(label: S, value: Cell) -> Self {
        Row {
            style: RowStyle::Title,
            cells: vec![Cell::text(label), value],
        }
    }

    fn label<S: Into<String>>(label: S, value: Cell) -> Self {
        Row {
            style: RowStyle::Label,
            cells: vec![Cell::text(label), value],
        }
    }

    fn spacer() -> Self {
        Row {
            style: RowStyle::Spacer,
            cells: vec![Cell::Blank, Cell::Blank],
        }
    }
}

/// Summary 工作表的內容
pub fn summary(report: &ValuationReport) -> Vec<Row> {
    let mut rows = vec![
        Row::title("Stock Code", Cell::text(report.stock_symbol.as_str())),
        Row::label("Current Price", Cell::number(report.current_price)),
        Row::label("Share Number", Cell::number(Some(report.profile.share_count))),
        Row::label("Latest P/E Ratio", Cell::number(report.latest_pe)),
        Row::label(
            "Latest 12 Months Revenue Sum",
            Cell::number(report.revenue_sum),
        ),
        Row::spacer(),
    ];

    stats_block(&mut rows, "Past 180 Weeks P/E Ratio", report.pe_stats.as_ref());
    rows.push(Row::spacer());
    stats_block(
        &mut rows,
        "Past 5 Years Net Profit Margin",
        report.profit_stats.as_ref(),
    );
    rows.push(Row::spacer());

    rows.push(Row::title(
        format!(
            "Price Prediction (Latest 12 Months Revenue Sum * {} * Profit Margin / {} * P/E)",
            report.profile.revenue_scale, report.profile.share_count
        ),
        Cell::Blank,
    ));

    if let Some(grid) = &report.grid {
        rows.extend(
            grid.labeled()
                .into_iter()
                .map(|(label, price)| Row::label(label, Cell::rounded(price))),
        );
    }

    rows
}

fn stats_block(rows: &mut Vec<Row>, title: &str, stats: Option<&SummaryStats>) {
    rows.push(Row::title(title, Cell::Blank));
    rows.push(Row::label("Minimum", Cell::number(stats.map(|s| s.min))));
    rows.push(Row::label("Average", Cell::number(stats.map(|s| s.avg))));
    rows.push(Row::label("Maximum", Cell::number(stats.map(|s| s.max))));
}

/// 原始資料工作表：表頭加上每筆資料
pub fn raw_sheet(table: &MetricTable) -> Vec<Vec<Cell>> {
    let mut rows = Vec::with_capacity(table.len() + 1);
    rows.push(vec![
        Cell::text("Year"),
        Cell::text(table.kind.period_header()),
        Cell::text(table.kind.value_header()),
    ]);

    for record in &table.records {
        rows.push(vec![
            Cell::Number(record.year as f64),
            Cell::Number(record.period as f64),
            Cell::number(record.value),
        ]);
    }

    rows
}

/// 工作表名稱，Summary 在最前面
pub fn sheet_names() -> Vec<String> {
    std::iter::once(SUMMARY_SHEET.to_string())
        .chain(MetricKind::iterator().map(|k| k.sheet_name()))
        .collect()
}
