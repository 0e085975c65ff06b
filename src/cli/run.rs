use crate::config::{load_config, resolve_config_path, Config};
use crate::consolidate::{consolidate, MergeStats};
use crate::model::{Batch, FieldSchema};
use crate::output::write_csv;
use crate::source::{discover_sources, BatchReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("field schema error: {0}")]
    Schema(#[from] crate::source::timestamp::TimestampError),

    #[error("{0}")]
    Discovery(#[from] crate::source::discovery::DiscoveryError),

    #[error("source reader error: {0}")]
    Reader(#[from] crate::source::reader::ReaderError),

    #[error("{0}")]
    Consolidate(#[from] crate::consolidate::ConsolidateError),

    #[error("output error: {0}")]
    Writer(#[from] crate::output::WriterError),
}

/// What the command line asked for.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub source_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    /// Overrides `output.filename`
    pub output_filename: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub sources: usize,
    pub rows_written: usize,
    pub stats: MergeStats,
}

pub fn run(options: &RunOptions) -> Result<RunSummary, RunError> {
    let mut config = match resolve_config_path(options.config_path.as_deref()) {
        Some(path) => {
            info!(config_path = %path.display(), "Loading configuration");
            load_config(&path)?
        }
        None => {
            info!("No config file found, using defaults");
            Config::default()
        }
    };

    if let Some(filename) = &options.output_filename {
        config.output.filename = filename.clone();
        crate::config::parse::validate_config(&config)?;
    }

    consolidate_dir(&options.source_dir, &config)
}

/// Consolidate every source file in `source_dir` into one output file in
/// the same directory.
pub fn consolidate_dir(source_dir: &Path, config: &Config) -> Result<RunSummary, RunError> {
    let schema = FieldSchema::from_config(&config.fields)?;
    let output_path = source_dir.join(&config.output.filename);

    info!(source_dir = %source_dir.display(), "Discovering ACLED source files");
    let sources = discover_sources(source_dir, &config.sources, &config.output.filename)?;

    info!(files = sources.len(), "Loading CSVs");
    let reader = BatchReader::new(&config.sources);
    let batches = sources
        .iter()
        .map(|source| reader.read(source))
        .collect::<Result<Vec<Batch>, _>>()?;

    let total_records: usize = batches.iter().map(Batch::len).sum();
    info!(batches = batches.len(), records = total_records, "Validating coverage and merging");
    let merged = consolidate(&batches, &schema)?;

    let stats = merged.stats();
    if stats.replaced + stats.discarded == 0 && batches.len() > 1 {
        warn!("No event appeared in more than one file; check that the downloads really overlap");
    }
    info!(
        unique_events = merged.len(),
        replaced = stats.replaced,
        discarded = stats.discarded,
        "Merged batches"
    );

    info!(path = %output_path.display(), "Writing result");
    let rows_written = write_csv(&output_path, &merged, config.output.order)?;

    info!(files = sources.len(), "Done. ACLED files consolidated");

    Ok(RunSummary {
        output_path,
        sources: sources.len(),
        rows_written,
        stats,
    })
}
