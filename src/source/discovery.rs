use crate::config::types::SourcesConfig;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read source directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source directory '{0}' does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("regex compilation failed: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("pattern missing 'seq' capture group")]
    MissingSeqGroup,

    #[error("{}", invalid_names_message(.0))]
    InvalidNames(Vec<String>),

    #[error("sequence prefix '{prefix}' of '{name}' is not a number")]
    BadPrefix { name: String, prefix: String },

    #[error("At least {required} valid ACLED source files are required, found {found}.")]
    TooFewSources { required: usize, found: usize },

    #[error("output file name '{0}' matches the source file pattern and would be read back as a source")]
    OutputMatchesPattern(String),
}

/// Name prefix of consolidated files written by earlier runs with the default
/// output name, including renamed copies such as `consolidated_acled_old.csv`.
pub const PREVIOUS_OUTPUT_PREFIX: &str = "consolidated_acled";

fn invalid_names_message(names: &[String]) -> String {
    let listing: Vec<String> = names.iter().map(|name| format!("  - {}", name)).collect();
    format!(
        "Found {} invalid ACLED source file(s).\n\
         Each CSV file in the source directory (other than earlier output files)\n\
         must follow the naming pattern:\n    NN-acled_<description>.csv\n\
         Examples:\n  - 01-acled_2021_download.csv\n  - 02-acled_2022_update.csv\n\
         Invalid files found:\n{}",
        names.len(),
        listing.join("\n")
    )
}

/// A source file accepted for consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// 1-based position in acquisition order
    pub sequence_index: usize,
    /// Numeric prefix taken from the file name
    pub prefix: u64,
    pub name: String,
    pub path: PathBuf,
}

/// Matches source file names and extracts their ordering prefix.
#[derive(Debug)]
pub struct SourceNamePattern {
    pattern: Regex,
}

impl SourceNamePattern {
    /// # Arguments
    /// * `pattern` - Regex pattern that must contain a named capture group 'seq'
    pub fn new(pattern: &str) -> Result<Self, DiscoveryError> {
        let regex = Regex::new(pattern)?;

        if regex.capture_names().all(|name| name != Some("seq")) {
            return Err(DiscoveryError::MissingSeqGroup);
        }

        Ok(Self { pattern: regex })
    }

    /// Whether `name` would be picked up as a source file.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Extract the numeric ordering prefix from a file name.
    ///
    /// Returns None if the name doesn't match the pattern.
    pub fn prefix(&self, name: &str) -> Option<Result<u64, DiscoveryError>> {
        let captures = self.pattern.captures(name)?;
        let seq = captures.name("seq")?.as_str();

        Some(seq.parse().map_err(|_| DiscoveryError::BadPrefix {
            name: name.to_string(),
            prefix: seq.to_string(),
        }))
    }
}

/// Find the source CSV files in `dir`, ordered by their numeric prefix.
///
/// The file named `output_filename` and files starting with
/// [`PREVIOUS_OUTPUT_PREFIX`] are earlier outputs and are skipped. Every other
/// `.csv` file must match the pattern.
pub fn discover_sources(
    dir: &Path,
    config: &SourcesConfig,
    output_filename: &str,
) -> Result<Vec<SourceFile>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    let pattern = SourceNamePattern::new(&config.pattern)?;
    // An output that looks like a source would be merged into the next run
    if pattern.matches(output_filename) {
        return Err(DiscoveryError::OutputMatchesPattern(
            output_filename.to_string(),
        ));
    }

    let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "csv") {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name == output_filename || name.starts_with(PREVIOUS_OUTPUT_PREFIX) {
            debug!(file = %name, "Skipping previous output file");
            continue;
        }

        match pattern.prefix(&name) {
            Some(prefix) => valid.push((prefix?, name, path)),
            None => invalid.push(name),
        }
    }

    if !invalid.is_empty() {
        invalid.sort();
        return Err(DiscoveryError::InvalidNames(invalid));
    }

    if valid.len() < config.min_files {
        return Err(DiscoveryError::TooFewSources {
            required: config.min_files,
            found: valid.len(),
        });
    }

    valid.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    let sources: Vec<SourceFile> = valid
        .into_iter()
        .enumerate()
        .map(|(i, (prefix, name, path))| SourceFile {
            sequence_index: i + 1,
            prefix,
            name,
            path,
        })
        .collect();

    for source in &sources {
        info!(
            sequence_index = source.sequence_index,
            file = %source.name,
            "Discovered source file"
        );
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_extracts_prefix() {
        let pattern = SourceNamePattern::new(&SourcesConfig::default().pattern).unwrap();

        assert_eq!(pattern.prefix("07-acled_2021_download.csv").unwrap().unwrap(), 7);
        assert_eq!(pattern.prefix("12-acled.csv").unwrap().unwrap(), 12);
        assert!(pattern.prefix("acled_2022.csv").is_none());
        assert!(pattern.prefix("1-acled.csv").is_none());
        assert!(pattern.prefix("01-acled.csv.bak").is_none());
    }

    #[test]
    fn test_missing_seq_group_error() {
        let result = SourceNamePattern::new(r"^(\d{2})-acled.*\.csv$");
        assert!(matches!(result, Err(DiscoveryError::MissingSeqGroup)));
    }

    #[test]
    fn test_invalid_regex() {
        let result = SourceNamePattern::new(r"(?P<seq>[invalid");
        assert!(matches!(result, Err(DiscoveryError::InvalidRegex(_))));
    }

    #[test]
    fn test_non_numeric_seq_is_rejected() {
        let pattern = SourceNamePattern::new(r"^(?P<seq>[a-z]+)-acled\.csv$").unwrap();
        assert!(matches!(
            pattern.prefix("ab-acled.csv"),
            Some(Err(DiscoveryError::BadPrefix { .. }))
        ));
    }

    #[test]
    fn test_output_matching_pattern_is_rejected() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = SourcesConfig::default();

        let err = discover_sources(temp_dir.path(), &config, "03-acled_merged.csv").unwrap_err();

        assert!(matches!(
            err,
            DiscoveryError::OutputMatchesPattern(ref name) if name == "03-acled_merged.csv"
        ));
    }

    #[test]
    fn test_invalid_names_message_lists_files() {
        let message =
            DiscoveryError::InvalidNames(vec!["acled_2022.csv".to_string()]).to_string();
        assert!(message.contains("Found 1 invalid ACLED source file(s)"));
        assert!(message.contains("NN-acled_<description>.csv"));
        assert!(message.contains("Invalid files found:\n  - acled_2022.csv"));
    }
}
