//! raiff-core: data model and classification rules for Raiffeisen statement reports

pub mod currency;
pub mod report;
pub mod rules;
pub mod table;

pub use currency::{Currency, UnknownCurrency};
pub use report::{
    CurrencyOperation, ExpenseSummary, FinancialOperation, IncomeSummary, Report,
    TopMerchantStat,
};
pub use rules::{Category, Matcher, RuleError, RuleSet, RuleSpec};
pub use table::{ForeignAmount, NormalizedTable, TransactionRow, COLUMN_HEADERS, NO_INFORMATION};
