//! raiff-ingest: Raiffeisen PDF statements → normalized tables, plus
//! per-currency merging.

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod merge;
pub mod normalize;
pub mod observer;
pub mod types;

pub use backend::{DocumentInfo, PdfBackend, StatementBackend, TabulaConfig};
pub use config::ExtractConfig;
pub use error::ExtractError;
pub use extract::{detect_currency, Extractor};
pub use layout::{plan_pages, Area, LayoutTable, PageJob, PageRole};
pub use merge::merge_tables;
pub use observer::{ExtractObserver, NoopObserver};
pub use types::{PageTable, RawColumn, RawRow};
