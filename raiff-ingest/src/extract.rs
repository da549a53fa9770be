//! Statement file → `NormalizedTable`.
//!
//! Files are processed one at a time; the pages of a file are extracted in
//! parallel on blocking workers (one permit per CPU core), joined, and put
//! back into page order before cleanup.

use raiff_core::{Currency, NormalizedTable};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::backend::StatementBackend;
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::layout::{plan_pages, PageJob};
use crate::normalize::normalize;
use crate::observer::ExtractObserver;
use crate::types::PageTable;

/// Find the statement currency: the token right after `label` on page 1.
pub fn detect_currency(first_page_text: &str, label: &str) -> Result<Currency, ExtractError> {
    let marker_not_found = || ExtractError::CurrencyMarkerNotFound {
        label: label.to_string(),
    };
    let re = Regex::new(&format!(r"{}\s*(?P<code>\S+)", regex::escape(label)))
        .map_err(|_| marker_not_found())?;
    let caps = re.captures(first_page_text).ok_or_else(marker_not_found)?;
    Ok(caps["code"].parse::<Currency>()?)
}

pub struct Extractor {
    backend: Arc<dyn StatementBackend>,
    config: ExtractConfig,
    workers: usize,
}

impl Extractor {
    pub fn new(backend: Arc<dyn StatementBackend>, config: ExtractConfig) -> Self {
        let workers = config
            .workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1);
        Self {
            backend,
            config,
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extract every file, skipping (and reporting) the ones that fail.
    pub async fn extract_all(
        &self,
        paths: &[PathBuf],
        observer: &dyn ExtractObserver,
    ) -> Vec<NormalizedTable> {
        let mut tables = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            observer.file_started(path, index, paths.len());
            match self.extract_file(path, observer).await {
                Ok(table) => {
                    tracing::info!(
                        path = %path.display(),
                        currency = %table.currency(),
                        rows = table.len(),
                        "statement extracted"
                    );
                    observer.file_finished(path, table.len());
                    tables.push(table);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping statement");
                    observer.file_failed(path, &err);
                }
            }
        }
        tables
    }

    pub async fn extract_file(
        &self,
        path: &Path,
        observer: &dyn ExtractObserver,
    ) -> Result<NormalizedTable, ExtractError> {
        let backend = Arc::clone(&self.backend);
        let owned = path.to_path_buf();
        let info = tokio::task::spawn_blocking(move || backend.inspect(&owned))
            .await
            .map_err(|e| ExtractError::Worker(e.to_string()))??;

        let currency = detect_currency(&info.first_page_text, &self.config.currency_label)?;
        let jobs = plan_pages(
            info.page_count,
            currency,
            &self.config.layout,
            self.config.crop_last_page,
        )?;
        tracing::debug!(
            path = %path.display(),
            %currency,
            pages = info.page_count,
            "planned page extraction"
        );

        let pages = self.extract_pages(path, jobs, observer).await?;
        let rows = normalize(pages, &self.config.payout_marker);
        Ok(NormalizedTable::new(currency, rows))
    }

    /// Run all page jobs concurrently and return them sorted by page number.
    /// Completion order is arbitrary; the sort restores document order.
    async fn extract_pages(
        &self,
        path: &Path,
        jobs: Vec<PageJob>,
        observer: &dyn ExtractObserver,
    ) -> Result<Vec<PageTable>, ExtractError> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();

        for job in jobs {
            let semaphore = Arc::clone(&semaphore);
            let backend = Arc::clone(&self.backend);
            let path = path.to_path_buf();
            set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ExtractError::Worker(e.to_string()))?;
                let rows = tokio::task::spawn_blocking(move || {
                    backend.extract_table(&path, job.page, job.area)
                })
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))??;
                Ok::<_, ExtractError>(PageTable {
                    page: job.page,
                    rows,
                })
            });
        }

        let mut pages = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            let page = joined.map_err(|e| ExtractError::Worker(e.to_string()))??;
            observer.page_extracted(path, page.page);
            pages.push(page);
        }
        pages.sort_by_key(|p| p.page);
        Ok(pages)
    }
}
