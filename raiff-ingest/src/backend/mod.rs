//! PDF access behind a trait, so the pipeline can run against real
//! statements (lopdf + tabula) or an in-memory fake in tests.

pub mod pdf;

use std::path::Path;

use crate::error::ExtractError;
use crate::layout::Area;
use crate::types::RawRow;

pub use pdf::{PdfBackend, TabulaConfig};

/// What the extractor needs to know about a document before planning pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: u32,
    pub first_page_text: String,
}

/// Capabilities the extractor needs from a PDF library. Calls are blocking
/// and may run concurrently for different pages of the same file.
pub trait StatementBackend: Send + Sync {
    /// Page count and raw text of page 1.
    fn inspect(&self, path: &Path) -> Result<DocumentInfo, ExtractError>;

    /// Rows of the table found on `page` (1-based), restricted to `area`
    /// when given.
    fn extract_table(
        &self,
        path: &Path,
        page: u32,
        area: Option<Area>,
    ) -> Result<Vec<RawRow>, ExtractError>;
}
