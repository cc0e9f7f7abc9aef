use std::path::Path;

use anyhow::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::{
    analysis::ValuationReport,
    report::{
        layout::{self, Cell, Row, RowStyle},
        ReportWriter,
    },
};

const TITLE_FILL: u32 = 0x1E3A8A;
const LABEL_FILL: u32 = 0xBFDBFE;

/// Summary 工作表用到的樣式
struct SummaryFormats {
    title: Format,
    label: Format,
    value: Format,
    rounded: Format,
}

impl SummaryFormats {
    fn new() -> Self {
        let base = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        SummaryFormats {
            title: base
                .clone()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(TITLE_FILL)),
            label: base
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(LABEL_FILL)),
            rounded: base.clone().set_num_format("0.00"),
            value: base,
        }
    }

    fn pick(&self, style: RowStyle, column: usize, cell: &Cell) -> &Format {
        match (style, column, cell) {
            (RowStyle::Title, _, _) => &self.title,
            (RowStyle::Label, 0, _) => &self.label,
            (_, _, Cell::Rounded(_)) => &self.rounded,
            _ => &self.value,
        }
    }
}

/// 以 rust_xlsxwriter 輸出 .xlsx
pub struct XlsxWriter;

impl ReportWriter for XlsxWriter {
    fn write(&self, report: &ValuationReport, path: &Path) -> Result<()> {
        write(report, path)
    }
}

/// 寫出整份活頁簿，Summary 在前，其後依序為各指標的原始資料
pub fn write(report: &ValuationReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name(layout::SUMMARY_SHEET)?;
    write_summary(summary, &layout::summary(report))?;

    for table in report.metrics.tables() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.kind.sheet_name())?;
        write_rows(sheet, &layout::raw_sheet(table))?;
        sheet.autofit();
    }

    workbook.save(path)?;
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, rows: &[Row]) -> Result<(), XlsxError> {
    let formats = SummaryFormats::new();

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.cells.iter().enumerate() {
            let format = formats.pick(row.style, c, cell);
            write_cell(sheet, r as u32, c as u16, cell, Some(format))?;
        }
    }

    sheet.autofit();
    Ok(())
}

fn write_rows(sheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<(), XlsxError> {
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            write_cell(sheet, r as u32, c as u16, cell, None)?;
        }
    }

    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (cell, format) {
        (Cell::Text(s), Some(f)) => {
            sheet.write_string_with_format(row, col, s, f)?;
        }
        (Cell::Text(s), None) => {
            sheet.write_string(row, col, s)?;
        }
        (Cell::Number(v) | Cell::Rounded(v), Some(f)) => {
            sheet.write_number_with_format(row, col, *v, f)?;
        }
        (Cell::Number(v) | Cell::Rounded(v), None) => {
            sheet.write_number(row, col, *v)?;
        }
        (Cell::Blank, Some(f)) => {
            sheet.write_blank(row, col, f)?;
        }
        (Cell::Blank, None) => {}
    }

    Ok(())
}
