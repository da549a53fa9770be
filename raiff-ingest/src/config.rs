use serde::{Deserialize, Serialize};

use crate::backend::TabulaConfig;
use crate::layout::LayoutTable;

/// Template knobs for the Raiffeisen statement layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Label on page 1 followed by the statement's currency code
    pub currency_label: String,
    /// Expense-column text marking the two header rows atop a page
    pub payout_marker: String,
    /// Crop the last page with its layout area instead of reading it whole
    pub crop_last_page: bool,
    /// Page workers per file; defaults to the number of CPU cores
    pub workers: Option<usize>,
    pub layout: LayoutTable,
    pub tabula: TabulaConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            currency_label: "Strana:".to_string(),
            payout_marker: "Isplata".to_string(),
            crop_last_page: false,
            workers: None,
            layout: LayoutTable::raiffeisen(),
            tabula: TabulaConfig::default(),
        }
    }
}
