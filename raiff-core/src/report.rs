//! Report types derived from a normalized statement table

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::table::NormalizedTable;

/// A labeled point-in-time amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialOperation {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub amount: f64,
}

impl FinancialOperation {
    pub fn new(title: impl Into<String>, date: Option<NaiveDate>, amount: f64) -> Self {
        Self {
            title: title.into(),
            date,
            amount,
        }
    }
}

/// A currency purchase: what was charged, what was bought, at which rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyOperation {
    pub spent: FinancialOperation,
    pub bought_amount: f64,
    pub bought_currency: Currency,
    pub exchange_rate: Option<f64>,
}

/// All transactions sharing one exact description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMerchantStat {
    pub title: String,
    pub total: f64,
    pub occurrences: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub total: f64,
    pub salaries: Vec<FinancialOperation>,
    pub meal_allowances: Vec<FinancialOperation>,
    /// Positive income not itemized as salary or meal allowance
    pub other: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total: f64,
    pub top_merchants: Vec<TopMerchantStat>,
    pub top_purchases: Vec<FinancialOperation>,
    pub cash_withdrawals: Vec<FinancialOperation>,
    pub currency_operations: Vec<CurrencyOperation>,
}

/// Everything the renderer needs for one output workbook/sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub table: NormalizedTable,
    pub income: IncomeSummary,
    pub expenses: ExpenseSummary,
    pub currency: Currency,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl Report {
    /// Share of income spent, in whole percent. `None` for a zero-income
    /// statement.
    pub fn spent_percent(&self) -> Option<i64> {
        if self.income.total == 0.0 {
            return None;
        }
        Some((self.expenses.total / self.income.total * 100.0) as i64)
    }

    pub fn left_over(&self) -> f64 {
        self.income.total - self.expenses.total
    }
}
