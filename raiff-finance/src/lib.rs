//! raiff-finance: statement aggregation (income/expense breakdowns, top merchants)

pub mod aggregator;

pub use aggregator::{parse_bought, top_merchants, Aggregator, TOP_N};
