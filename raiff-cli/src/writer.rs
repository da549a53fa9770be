//! xlsx rendering of reports: one workbook per report, or every report as a
//! sheet of a single `Report.xlsx`.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use raiff_core::{
    CurrencyOperation, ExpenseSummary, FinancialOperation, ForeignAmount, IncomeSummary,
    NormalizedTable, Report, COLUMN_HEADERS, NO_INFORMATION,
};
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Table, TableColumn, TableStyle,
    Workbook, Worksheet, XlsxError,
};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

const BG_HEADER: u32 = 0xD9E1F2;
const BG_INCOME: u32 = 0xC6EFCE;
const BG_EXPENSE: u32 = 0xFFC7CE;
const BG_LABELS: u32 = 0xF2F2F2;

const AMOUNT_FORMAT: &str = "#,##0.00";
const DATE_FORMAT: &str = "dd.mm.yyyy";

pub const SINGLE_FILE_NAME: &str = "Report.xlsx";

/// Column of the left-hand tables in the expense section
const LEFT_TABLE_COL: u16 = 1;
/// Column of the right-hand tables in the expense section
const RIGHT_TABLE_COL: u16 = 5;

pub struct ReportWriter {
    output_dir: PathBuf,
    single_file: bool,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, single_file: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            single_file,
        }
    }

    /// Write every report and return the paths of the files created.
    pub fn write_all(&self, reports: &[Report]) -> Result<Vec<PathBuf>> {
        if reports.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("create output dir {}", self.output_dir.display()))?;

        if self.single_file {
            let path = self.output_dir.join(SINGLE_FILE_NAME);
            let mut workbook = Workbook::new();
            let mut used = HashSet::new();
            for report in reports {
                let name = unique_name(&sheet_name(report), &mut used);
                render_sheet(&mut workbook, &name, report)
                    .with_context(|| format!("render sheet {name}"))?;
            }
            workbook
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), sheets = reports.len(), "workbook written");
            return Ok(vec![path]);
        }

        let mut written = Vec::with_capacity(reports.len());
        let mut used = HashSet::new();
        for report in reports {
            let stem = unique_name(&file_stem(report), &mut used);
            let path = self.output_dir.join(format!("{stem}.xlsx"));
            let mut workbook = Workbook::new();
            render_sheet(&mut workbook, &sheet_name(report), report)
                .with_context(|| format!("render {}", path.display()))?;
            workbook
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = report.table.len(), "workbook written");
            written.push(path);
        }
        Ok(written)
    }
}

/// `01.Mar.2023`, or `unknown` for a statement without dates.
pub fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d.%b.%Y").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn sheet_name(report: &Report) -> String {
    format!("{}-{}", date_label(report.from_date), date_label(report.to_date))
}

fn file_stem(report: &Report) -> String {
    format!("Report-{}-{}", report.currency.code(), sheet_name(report))
}

/// Two reports can cover the same period: RSD and EUR of one month share a
/// sheet name, the same statement passed twice shares a file name.
fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while used.contains(&name) {
        name = format!("{base} ({n})");
        n += 1;
    }
    used.insert(name.clone());
    name
}

pub fn spent_label(report: &Report) -> String {
    report
        .spent_percent()
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| "n/a".to_string())
}

struct Formats {
    label: Format,
    bold: Format,
    right: Format,
    amount: Format,
    date: Format,
    income_cell: Format,
    expense_cell: Format,
    left_cell: Format,
    income_total: Format,
}

impl Formats {
    fn new() -> Self {
        let boxed = || {
            Format::new()
                .set_align(FormatAlign::Right)
                .set_border(FormatBorder::Thin)
                .set_num_format(AMOUNT_FORMAT)
        };
        Self {
            label: Self::label(BG_LABELS),
            bold: Format::new().set_bold(),
            right: Format::new().set_align(FormatAlign::Right),
            amount: Format::new().set_num_format(AMOUNT_FORMAT),
            date: Format::new()
                .set_num_format(DATE_FORMAT)
                .set_align(FormatAlign::Right),
            income_cell: boxed().set_background_color(Color::RGB(BG_INCOME)),
            expense_cell: boxed().set_background_color(Color::RGB(BG_EXPENSE)),
            left_cell: boxed(),
            income_total: Format::new()
                .set_bold()
                .set_align(FormatAlign::Right)
                .set_num_format(AMOUNT_FORMAT)
                .set_background_color(Color::RGB(BG_INCOME)),
        }
    }

    fn label(bg: u32) -> Format {
        Format::new()
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_font_size(12)
            .set_background_color(Color::RGB(bg))
    }

    fn section(bg: u32) -> Format {
        Format::new()
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_font_size(14)
            .set_background_color(Color::RGB(bg))
    }
}

fn render_sheet(workbook: &mut Workbook, name: &str, report: &Report) -> Result<(), XlsxError> {
    let formats = Formats::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    let mut w = SheetWriter {
        sheet,
        formats: &formats,
        row: 0,
    };
    w.section(1, 15, "General report", BG_HEADER, 30)?;
    w.transactions(&report.table)?;
    w.totals(report)?;
    w.income(&report.income)?;
    w.expenses(&report.expenses)?;
    w.sheet.autofit();
    Ok(())
}

/// Writes sections top to bottom; `row` is the next free row.
struct SheetWriter<'a> {
    sheet: &'a mut Worksheet,
    formats: &'a Formats,
    row: u32,
}

impl SheetWriter<'_> {
    fn gap(&mut self, rows: u32) {
        self.row += rows;
    }

    fn section(
        &mut self,
        col: u16,
        width: u16,
        title: &str,
        bg: u32,
        height: u16,
    ) -> Result<(), XlsxError> {
        self.sheet.merge_range(
            self.row,
            col,
            self.row,
            col + width - 1,
            title,
            &Formats::section(bg),
        )?;
        self.sheet.set_row_height(self.row, height)?;
        self.gap(1);
        Ok(())
    }

    fn labels(&mut self, col: u16, titles: &[&str]) -> Result<(), XlsxError> {
        for (i, title) in titles.iter().enumerate() {
            self.sheet
                .write_string_with_format(self.row, col + i as u16, *title, &self.formats.label)?;
        }
        self.gap(1);
        Ok(())
    }

    fn date_cell(&mut self, row: u32, col: u16, date: Option<NaiveDate>) -> Result<(), XlsxError> {
        // out-of-range years (before 1900) are left blank like unparsable ones
        let excel_date = date.and_then(|d| {
            ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8).ok()
        });
        match excel_date {
            Some(dt) => {
                self.sheet
                    .write_datetime_with_format(row, col, &dt, &self.formats.date)?;
            }
            // unparsable dates stay empty, not "No information"
            None => {
                self.sheet.write_blank(row, col, &self.formats.date)?;
            }
        }
        Ok(())
    }

    fn amount_cell(&mut self, row: u32, col: u16, value: Option<f64>) -> Result<(), XlsxError> {
        match value {
            Some(v) => self
                .sheet
                .write_number_with_format(row, col, v, &self.formats.amount)?,
            None => self.sheet.write_string(row, col, NO_INFORMATION)?,
        };
        Ok(())
    }

    /// The statement rows as an Excel table with a leading `№` index column.
    /// An empty statement still gets one (blank) data row.
    fn transactions(&mut self, table: &NormalizedTable) -> Result<(), XlsxError> {
        let header_row = self.row;
        let data_rows = table.len().max(1) as u32;

        let mut columns = vec![TableColumn::new().set_header("№")];
        columns.extend(COLUMN_HEADERS.iter().map(|h| TableColumn::new().set_header(*h)));
        let excel_table = Table::new()
            .set_style(TableStyle::Medium9)
            .set_columns(&columns);
        self.sheet.add_table(
            header_row,
            0,
            header_row + data_rows,
            COLUMN_HEADERS.len() as u16,
            &excel_table,
        )?;

        for (i, tx) in table.rows().iter().enumerate() {
            let row = header_row + 1 + i as u32;
            self.sheet.write_number(row, 0, i as f64)?;
            self.date_cell(row, 1, tx.transaction_date)?;
            self.date_cell(row, 2, tx.completion_date)?;
            self.sheet.write_string_with_format(
                row,
                3,
                tx.card_number.as_deref().unwrap_or(NO_INFORMATION),
                &self.formats.right,
            )?;
            self.sheet.write_string(row, 4, tx.description.as_str())?;
            match &tx.foreign_amount {
                ForeignAmount::Number(n) => self.amount_cell(row, 5, Some(*n))?,
                other => {
                    self.sheet.write_string(row, 5, other.to_string())?;
                }
            }
            self.sheet.write_string(
                row,
                6,
                tx.original_amount.as_deref().unwrap_or(NO_INFORMATION),
            )?;
            match tx.exchange_rate {
                Some(rate) => {
                    self.sheet.write_number(row, 7, rate)?;
                }
                None => {
                    self.sheet.write_string(row, 7, NO_INFORMATION)?;
                }
            }
            self.amount_cell(row, 8, tx.expense)?;
            self.amount_cell(row, 9, tx.income)?;
            self.amount_cell(row, 10, Some(tx.balance))?;
        }

        self.row = header_row + data_rows + 2;
        Ok(())
    }

    fn totals(&mut self, report: &Report) -> Result<(), XlsxError> {
        let f = self.formats;
        let lines = [
            ("Total income:", report.income.total, &f.income_cell),
            ("Total expenses:", report.expenses.total, &f.expense_cell),
            ("Left:", report.left_over(), &f.left_cell),
        ];
        for (label, value, format) in lines {
            self.sheet.write_string_with_format(self.row, 9, label, &f.bold)?;
            self.sheet.write_number_with_format(self.row, 10, value, format)?;
            self.gap(1);
        }

        self.sheet.write_string_with_format(self.row, 8, "You spent", &f.bold)?;
        self.sheet
            .write_string_with_format(self.row, 9, spent_label(report), &f.left_cell)?;
        self.sheet
            .write_string_with_format(self.row, 10, "of your income", &f.bold)?;
        self.gap(1);
        Ok(())
    }

    fn financial_operations(
        &mut self,
        col: u16,
        ops: &[FinancialOperation],
    ) -> Result<(), XlsxError> {
        self.labels(col, &["Date", "Description", "Amount"])?;
        for op in ops {
            self.financial_operation(col, op)?;
            self.gap(1);
        }
        Ok(())
    }

    fn financial_operation(&mut self, col: u16, op: &FinancialOperation) -> Result<(), XlsxError> {
        self.date_cell(self.row, col, op.date)?;
        self.sheet
            .write_string_with_format(self.row, col + 1, op.title.as_str(), &self.formats.right)?;
        self.sheet
            .write_number_with_format(self.row, col + 2, op.amount, &self.formats.amount)?;
        Ok(())
    }

    fn income(&mut self, income: &IncomeSummary) -> Result<(), XlsxError> {
        self.section(1, 10, "Income statistics", BG_INCOME, 25)?;
        self.section(1, 3, "Incomes", BG_HEADER, 20)?;

        let itemized: Vec<FinancialOperation> = income
            .salaries
            .iter()
            .chain(&income.meal_allowances)
            .cloned()
            .collect();
        self.financial_operations(1, &itemized)?;

        self.sheet
            .write_string_with_format(self.row, 2, "Other:", &self.formats.bold)?;
        self.sheet
            .write_number_with_format(self.row, 3, income.other, &self.formats.amount)?;
        self.gap(1);

        self.sheet
            .write_string_with_format(self.row, 2, "Total:", &self.formats.bold)?;
        self.sheet
            .write_number_with_format(self.row, 3, income.total, &self.formats.income_total)?;
        self.gap(2);
        Ok(())
    }

    /// Two rows of side-by-side tables: purchases | merchants, then
    /// withdrawals | currency operations.
    fn expenses(&mut self, expenses: &ExpenseSummary) -> Result<(), XlsxError> {
        self.section(1, 10, "Expenses statistics", BG_EXPENSE, 25)?;

        let top_row = self.row;
        self.section(LEFT_TABLE_COL, 3, "Top-5 biggest purchases", BG_HEADER, 20)?;
        self.financial_operations(LEFT_TABLE_COL, &expenses.top_purchases)?;
        let left_end = self.row;

        self.row = top_row;
        self.section(RIGHT_TABLE_COL, 4, "Top-5 expenses", BG_HEADER, 20)?;
        self.labels(
            RIGHT_TABLE_COL,
            &["Description", "Amount", "Times", "Average bill"],
        )?;
        for stat in &expenses.top_merchants {
            let (row, col, f) = (self.row, RIGHT_TABLE_COL, self.formats);
            self.sheet
                .write_string_with_format(row, col, stat.title.as_str(), &f.right)?;
            self.sheet
                .write_number_with_format(row, col + 1, stat.total, &f.amount)?;
            self.sheet.write_number(row, col + 2, stat.occurrences as f64)?;
            self.sheet
                .write_number_with_format(row, col + 3, stat.average, &f.amount)?;
            self.gap(1);
        }
        self.row = self.row.max(left_end) + 1;

        let bottom_row = self.row;
        self.section(LEFT_TABLE_COL, 3, "Cash withdraws", BG_HEADER, 20)?;
        self.financial_operations(LEFT_TABLE_COL, &expenses.cash_withdrawals)?;
        let left_end = self.row;

        self.row = bottom_row;
        self.currency_operations(&expenses.currency_operations)?;
        self.row = self.row.max(left_end) + 2;
        Ok(())
    }

    fn currency_operations(&mut self, ops: &[CurrencyOperation]) -> Result<(), XlsxError> {
        let col = RIGHT_TABLE_COL;
        self.section(col, 6, "Currency operations", BG_HEADER, 20)?;
        self.labels(
            col,
            &[
                "Date",
                "Description",
                "Amount",
                "Purchased",
                "Currency",
                "Exchange rate",
            ],
        )?;
        for op in ops {
            self.financial_operation(col, &op.spent)?;
            let (row, f) = (self.row, self.formats);
            self.sheet
                .write_number_with_format(row, col + 3, op.bought_amount, &f.amount)?;
            self.sheet
                .write_string(row, col + 4, op.bought_currency.code())?;
            match op.exchange_rate {
                Some(rate) => {
                    self.sheet.write_number(row, col + 5, rate)?;
                }
                None => {
                    self.sheet.write_string(row, col + 5, NO_INFORMATION)?;
                }
            }
            self.gap(1);
        }
        Ok(())
    }
}
