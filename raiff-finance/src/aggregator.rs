//! Aggregator: turns a normalized statement table into a `Report` with
//! income and expense breakdowns.
//!
//! The expense views (top merchants, top purchases, cash withdrawals,
//! currency operations) overlap; they are not a partition of the expense
//! column.

use raiff_core::{
    Category, Currency, CurrencyOperation, ExpenseSummary, FinancialOperation, IncomeSummary,
    NormalizedTable, Report, RuleSet, TopMerchantStat, TransactionRow,
};
use std::collections::HashMap;

/// Length of the top-merchant and top-purchase lists
pub const TOP_N: usize = 5;

pub struct Aggregator {
    rules: RuleSet,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(RuleSet::raiffeisen())
    }
}

impl Aggregator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// One report per table, in input order
    pub fn generate_reports(&self, tables: Vec<NormalizedTable>) -> Vec<Report> {
        tables.into_iter().map(|t| self.report(t)).collect()
    }

    pub fn report(&self, table: NormalizedTable) -> Report {
        let income = self.income(&table);
        let expenses = self.expenses(&table);
        let (from_date, to_date) = match table.date_range() {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };
        tracing::debug!(
            currency = %table.currency(),
            rows = table.len(),
            income = income.total,
            expenses = expenses.total,
            "report aggregated"
        );
        Report {
            currency: table.currency(),
            table,
            income,
            expenses,
            from_date,
            to_date,
        }
    }

    /// Positive income rows split into salary, meal allowance and the rest.
    /// The total is summed over the whole income column on its own.
    pub fn income(&self, table: &NormalizedTable) -> IncomeSummary {
        let mut salaries = Vec::new();
        let mut meal_allowances = Vec::new();
        let mut other = 0.0;

        for row in table.rows() {
            let Some(amount) = row.income.filter(|v| *v > 0.0) else {
                continue;
            };
            let desc = &row.description;
            if self.rules.matches(Category::Salary, desc) {
                salaries.push(FinancialOperation::new(
                    Category::Salary.title(),
                    row.transaction_date,
                    amount,
                ));
            } else if self.rules.matches(Category::MealAllowance, desc) {
                meal_allowances.push(FinancialOperation::new(
                    Category::MealAllowance.title(),
                    row.transaction_date,
                    amount,
                ));
            } else {
                other += amount;
            }
        }

        IncomeSummary {
            total: table.rows().iter().filter_map(|r| r.income).sum(),
            salaries,
            meal_allowances,
            other,
        }
    }

    pub fn expenses(&self, table: &NormalizedTable) -> ExpenseSummary {
        let rows = table.rows();
        ExpenseSummary {
            total: rows.iter().filter_map(|r| r.expense).sum(),
            top_merchants: top_merchants(rows),
            top_purchases: self.top_purchases(rows),
            cash_withdrawals: self.cash_withdrawals(rows),
            currency_operations: self.currency_operations(rows),
        }
    }

    /// Largest single expenses, leaving out cash withdrawals and currency
    /// purchases.
    fn top_purchases(&self, rows: &[TransactionRow]) -> Vec<FinancialOperation> {
        let mut purchases: Vec<&TransactionRow> = rows
            .iter()
            .filter(|r| r.expense.is_some())
            .filter(|r| !self.rules.matches(Category::CashWithdrawal, &r.description))
            .filter(|r| !self.rules.matches(Category::CurrencyExchange, &r.description))
            .collect();
        purchases.sort_by(|a, b| b.expense_or_zero().total_cmp(&a.expense_or_zero()));
        purchases
            .into_iter()
            .take(TOP_N)
            .map(|r| {
                FinancialOperation::new(r.description.clone(), r.transaction_date, r.expense_or_zero())
            })
            .collect()
    }

    fn cash_withdrawals(&self, rows: &[TransactionRow]) -> Vec<FinancialOperation> {
        rows.iter()
            .filter(|r| self.rules.matches(Category::CashWithdrawal, &r.description))
            .map(|r| {
                FinancialOperation::new(
                    Category::CashWithdrawal.title(),
                    r.transaction_date,
                    r.expense_or_zero(),
                )
            })
            .collect()
    }

    fn currency_operations(&self, rows: &[TransactionRow]) -> Vec<CurrencyOperation> {
        rows.iter()
            .filter(|r| self.rules.matches(Category::CurrencyExchange, &r.description))
            .filter_map(|r| {
                let Some((bought_amount, bought_currency)) =
                    r.original_amount.as_deref().and_then(parse_bought)
                else {
                    tracing::warn!(
                        description = %r.description,
                        original_amount = ?r.original_amount,
                        "currency operation without a readable bought amount, skipped"
                    );
                    return None;
                };
                Some(CurrencyOperation {
                    spent: FinancialOperation::new(
                        Category::CurrencyExchange.title(),
                        r.transaction_date,
                        r.expense_or_zero(),
                    ),
                    bought_amount,
                    bought_currency,
                    exchange_rate: r.exchange_rate,
                })
            })
            .collect()
    }
}

/// `"100.00 EUR"` → `(100.0, Eur)`: the last three characters are the code,
/// everything before the separator is the amount.
pub fn parse_bought(original: &str) -> Option<(f64, Currency)> {
    let s = original.trim();
    let len = s.len();
    if len < 4 {
        return None;
    }
    let currency = s.get(len - 3..)?.parse::<Currency>().ok()?;
    let amount = s.get(..len - 4)?.trim().replace(',', "").parse::<f64>().ok()?;
    Some((amount, currency))
}

/// Groups by exact description, most frequent first. Ties keep the order in
/// which descriptions first appear.
pub fn top_merchants(rows: &[TransactionRow]) -> Vec<TopMerchantStat> {
    struct Group<'a> {
        title: &'a str,
        occurrences: usize,
        expenses: Vec<f64>,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for row in rows {
        let i = *index.entry(row.description.as_str()).or_insert_with(|| {
            groups.push(Group {
                title: &row.description,
                occurrences: 0,
                expenses: Vec::new(),
            });
            groups.len() - 1
        });
        groups[i].occurrences += 1;
        if let Some(e) = row.expense {
            groups[i].expenses.push(e);
        }
    }

    groups.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    groups
        .into_iter()
        .take(TOP_N)
        .map(|g| {
            let total: f64 = g.expenses.iter().sum();
            let average = if g.expenses.is_empty() {
                0.0
            } else {
                total / g.expenses.len() as f64
            };
            TopMerchantStat {
                title: g.title.to_string(),
                total,
                occurrences: g.occurrences,
                average,
            }
        })
        .collect()
}
