//! Normalized statement table: one row per transaction, fixed column schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;

/// Placeholder rendered for any value the statement did not carry.
pub const NO_INFORMATION: &str = "No information";

/// Column headers in rendering order.
pub const COLUMN_HEADERS: [&str; 10] = [
    "Transaction date",
    "Completion date",
    "Card number",
    "Transaction description",
    "Amount in foreign currency",
    "Amount in original currency",
    "Exchange rate",
    "Expense",
    "Income",
    "Balance",
];

/// The foreign-currency amount column is coerced leniently: numeric when it
/// parses, otherwise the raw text is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForeignAmount {
    Number(f64),
    Text(String),
    Missing,
}

impl ForeignAmount {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ForeignAmount::Missing,
            Some(s) => match s.parse::<f64>() {
                Ok(n) => ForeignAmount::Number(n),
                Err(_) => ForeignAmount::Text(s.to_string()),
            },
        }
    }
}

impl fmt::Display for ForeignAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignAmount::Number(n) => write!(f, "{n}"),
            ForeignAmount::Text(s) => f.write_str(s),
            ForeignAmount::Missing => f.write_str(NO_INFORMATION),
        }
    }
}

/// One transaction line of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub card_number: Option<String>,
    /// Description with the "No information" placeholder already applied
    pub description: String,
    pub foreign_amount: ForeignAmount,
    /// Original-currency amount text, thousands separators stripped
    pub original_amount: Option<String>,
    /// Filled from the conversion note on the following statement line
    pub exchange_rate: Option<f64>,
    pub expense: Option<f64>,
    pub income: Option<f64>,
    pub balance: f64,
}

impl TransactionRow {
    pub fn expense_or_zero(&self) -> f64 {
        self.expense.unwrap_or(0.0)
    }
}

/// A statement (or a merged group of statements) in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    currency: Currency,
    rows: Vec<TransactionRow>,
}

impl NormalizedTable {
    pub fn new(currency: Currency, rows: Vec<TransactionRow>) -> Self {
        Self { currency, rows }
    }

    /// Concatenate tables in iteration order. Rows are renumbered from 0 by
    /// position.
    pub fn concat(currency: Currency, tables: impl IntoIterator<Item = NormalizedTable>) -> Self {
        let rows = tables.into_iter().flat_map(|t| t.rows).collect();
        Self { currency, rows }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn rows(&self) -> &[TransactionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest transaction date, ignoring rows without one.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().filter_map(|r| r.transaction_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: Option<NaiveDate>, balance: f64) -> TransactionRow {
        TransactionRow {
            transaction_date: date,
            completion_date: date,
            card_number: None,
            description: "MAXI 042".to_string(),
            foreign_amount: ForeignAmount::Missing,
            original_amount: None,
            exchange_rate: None,
            expense: Some(10.0),
            income: None,
            balance,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_foreign_amount_is_lenient() {
        assert_eq!(ForeignAmount::parse(Some("12.50")), ForeignAmount::Number(12.5));
        assert_eq!(
            ForeignAmount::parse(Some("12.50 EUR")),
            ForeignAmount::Text("12.50 EUR".to_string())
        );
        assert_eq!(ForeignAmount::parse(Some("  ")), ForeignAmount::Missing);
        assert_eq!(ForeignAmount::parse(None).to_string(), NO_INFORMATION);
    }

    #[test]
    fn test_date_range_skips_missing_dates() {
        let table = NormalizedTable::new(
            Currency::Rsd,
            vec![
                row(Some(d(2023, 3, 5)), 1.0),
                row(None, 2.0),
                row(Some(d(2023, 2, 1)), 3.0),
                row(Some(d(2023, 3, 31)), 4.0),
            ],
        );
        assert_eq!(table.date_range(), Some((d(2023, 2, 1), d(2023, 3, 31))));
    }

    #[test]
    fn test_date_range_empty_table() {
        let table = NormalizedTable::new(Currency::Eur, vec![row(None, 1.0)]);
        assert_eq!(table.date_range(), None);
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = NormalizedTable::new(Currency::Rsd, vec![row(None, 1.0), row(None, 2.0)]);
        let b = NormalizedTable::new(Currency::Rsd, vec![row(None, 3.0)]);
        let merged = NormalizedTable::concat(Currency::Rsd, [a, b]);
        let balances: Vec<f64> = merged.rows().iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![1.0, 2.0, 3.0]);
    }
}
