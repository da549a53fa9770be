use raiff_core::{Currency, UnknownCurrency};
use thiserror::Error;

use crate::layout::PageRole;

/// Reasons a statement file could not be turned into a table. Any of these
/// skips the file; the batch continues.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("document has no pages")]
    EmptyDocument,

    #[error("currency marker {label:?} not found on first page")]
    CurrencyMarkerNotFound { label: String },

    #[error(transparent)]
    UnsupportedCurrency(#[from] UnknownCurrency),

    #[error("no crop area configured for {currency} {role:?} page")]
    MissingLayout { currency: Currency, role: PageRole },

    #[error("tabula failed on page {page}: {message}")]
    Tabula { page: u32, message: String },

    #[error("could not decode tabula output for page {page}: {source}")]
    TabulaOutput {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("page {page}: row has {found} cells, expected at most {expected}")]
    ColumnMismatch {
        page: u32,
        expected: usize,
        found: usize,
    },

    #[error("page worker failed: {0}")]
    Worker(String),
}
