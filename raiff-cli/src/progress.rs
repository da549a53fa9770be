use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use raiff_ingest::{ExtractError, ExtractObserver};
use std::path::Path;
use std::time::Duration;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One bar over all input files; page completions only refresh the message.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(files: usize) -> Self {
        let bar = ProgressBar::new(files as u64);
        let style = ProgressStyle::with_template(
            "{prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} files {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        bar.set_style(style);
        bar.set_prefix("Reading");
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ExtractObserver for ProgressObserver {
    fn file_started(&self, path: &Path, _index: usize, _total: usize) {
        self.bar.set_message(file_name(path));
    }

    fn page_extracted(&self, path: &Path, page: u32) {
        self.bar.set_message(format!("{} (page {page})", file_name(path)));
    }

    fn file_finished(&self, _path: &Path, _rows: usize) {
        self.bar.inc(1);
    }

    fn file_failed(&self, path: &Path, error: &ExtractError) {
        self.bar.println(
            format!("Skipping {}: {error}", path.display())
                .red()
                .to_string(),
        );
        self.bar.inc(1);
    }
}

/// Spinner for the steps that have no natural unit count.
pub fn spinner(msg: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(msg);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
