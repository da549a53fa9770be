use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use raiff_finance::Aggregator;
use raiff_ingest::{merge_tables, Extractor, PdfBackend};
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod files;
mod output;
mod progress;
mod writer;

use files::FileSelection;
use progress::ProgressObserver;
use writer::ReportWriter;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("RAIFF_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "raiff",
    version = VERSION,
    about = "Turn Raiffeisen bank PDF statements into xlsx reports"
)]
struct Cli {
    /// Paths to Raiffeisen bank statement PDF files
    #[arg(short, long, num_args = 1.., required = true)]
    files: Vec<PathBuf>,

    /// Merge statements of the same currency into one report
    #[arg(short, long)]
    merge: bool,

    /// Directory the reports are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write all reports as sheets of one Report.xlsx
    #[arg(short, long)]
    single_file: bool,

    /// Config file (default: ~/.raiff/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip missing input files without asking
    #[arg(short, long)]
    yes: bool,

    /// Crop the last page with the layout area instead of reading it whole
    #[arg(long)]
    crop_last_page: bool,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    // quiet by default, the progress bar owns the terminal
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref())?;
    if cli.crop_last_page {
        config.extract.crop_last_page = true;
    }
    let rules = config.rule_set()?;

    let selection = files::select_existing(&cli.files, |path| {
        output::warning(&format!("It seems like file {} does not exist!", path.display()));
        if cli.yes {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt("Want to skip this file and continue?")
            .default(false)
            .interact()
            .context("read confirmation")
    })?;
    let files = match selection {
        FileSelection::Proceed(files) => files,
        FileSelection::Abort => {
            output::error("Aborted.");
            std::process::exit(1);
        }
    };
    if files.is_empty() {
        output::warning("No statements to process.");
        return Ok(());
    }

    let backend = Arc::new(PdfBackend::new(config.extract.tabula.clone()));
    let extractor = Extractor::new(backend, config.extract);
    tracing::debug!(
        workers = extractor.workers(),
        files = files.len(),
        "starting extraction"
    );

    let observer = ProgressObserver::new(files.len());
    let tables = extractor.extract_all(&files, &observer).await;
    observer.finish();
    if tables.is_empty() {
        output::warning("None of the statements could be read.");
        return Ok(());
    }
    let tables = merge_tables(tables, cli.merge);

    let spinner = progress::spinner("Building reports");
    let reports = Aggregator::new(rules).generate_reports(tables);
    let written = ReportWriter::new(&cli.output_dir, cli.single_file).write_all(&reports);
    spinner.finish_and_clear();

    for path in written? {
        output::info(&format!("Wrote {}", path.display()));
    }
    output::success("Done!");
    Ok(())
}
