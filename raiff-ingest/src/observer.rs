//! Progress callbacks for the extraction batch. The pipeline itself never
//! prints; the CLI plugs in a progress bar.

use std::path::Path;

use crate::error::ExtractError;

pub trait ExtractObserver: Send + Sync {
    fn file_started(&self, _path: &Path, _index: usize, _total: usize) {}

    fn page_extracted(&self, _path: &Path, _page: u32) {}

    fn file_finished(&self, _path: &Path, _rows: usize) {}

    fn file_failed(&self, _path: &Path, _error: &ExtractError) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExtractObserver for NoopObserver {}
