use crate::config::types::{IsoBackfillConfig, SourcesConfig};
use crate::model::{Batch, Record};
use crate::source::discovery::SourceFile;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV '{source_name}': {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("'{source_name}' is missing expected columns: {}", .columns.join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error(
        "'{source_name}': numeric ISO codes could not be mapped to a three-letter equivalent: {}",
        .codes.join(", ")
    )]
    UnmappedIsoCodes {
        source_name: String,
        codes: Vec<String>,
    },
}

/// Reads source CSV files into batches, normalising each to the configured schema.
pub struct BatchReader<'c> {
    config: &'c SourcesConfig,
}

impl<'c> BatchReader<'c> {
    /// Create a new BatchReader for the given source settings
    pub fn new(config: &'c SourcesConfig) -> Self {
        Self { config }
    }

    /// Read a discovered source file from disk.
    pub fn read(&self, source: &SourceFile) -> Result<Batch, ReaderError> {
        let file = File::open(&source.path).map_err(|e| ReaderError::Io {
            path: source.path.clone(),
            source: e,
        })?;
        self.read_from(source.sequence_index, &source.name, file)
    }

    /// Parse CSV text from any reader into a batch named `source_name`.
    pub fn read_from<R: Read>(
        &self,
        sequence_index: usize,
        source_name: &str,
        input: R,
    ) -> Result<Batch, ReaderError> {
        let csv_error = |source: csv::Error| ReaderError::Csv {
            source_name: source_name.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new().from_reader(input);
        // Exports sometimes pad header names
        let mut columns: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        // Rows are kept as text; only the consolidation stages interpret values
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_error)?;
            let record: Record = columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.as_str(), value))
                .collect();
            records.push(record);
        }

        if let Some(column) = &self.config.provenance_column {
            append_provenance(&mut columns, &mut records, column, source_name);
        }

        if let Some(backfill) = &self.config.iso3_backfill {
            backfill_iso3(&mut columns, &mut records, backfill, source_name)?;
        }

        if let Some(retained) = &self.config.retained_columns {
            let mut retained = retained.clone();
            if let Some(column) = &self.config.provenance_column {
                if !retained.contains(column) {
                    retained.push(column.clone());
                }
            }
            records = retain_columns(&columns, &records, &retained, source_name)?;
            columns = retained;
        }

        debug!(
            sequence_index,
            source = source_name,
            records = records.len(),
            columns = columns.len(),
            "Loaded batch"
        );

        Ok(Batch::new(sequence_index, source_name, columns, records))
    }
}

/// Tag every record with the file it came from.
fn append_provenance(
    columns: &mut Vec<String>,
    records: &mut [Record],
    column: &str,
    source_name: &str,
) {
    if !columns.iter().any(|c| c == column) {
        columns.push(column.to_string());
    }
    for record in records.iter_mut() {
        record.insert(column, source_name);
    }
}

/// Derive the alpha-3 column from the numeric one when a file lacks it.
fn backfill_iso3(
    columns: &mut Vec<String>,
    records: &mut [Record],
    backfill: &IsoBackfillConfig,
    source_name: &str,
) -> Result<(), ReaderError> {
    // Newer exports already carry the alpha-3 column
    if columns.contains(&backfill.alpha3_column) {
        return Ok(());
    }
    if !columns.contains(&backfill.numeric_column) {
        return Err(ReaderError::MissingColumns {
            source_name: source_name.to_string(),
            columns: vec![backfill.numeric_column.clone()],
        });
    }

    // Collect every unmapped code so the error lists them all at once
    let mut unknown = BTreeSet::new();
    let mut derived = Vec::with_capacity(records.len());
    for record in records.iter() {
        let raw = record.raw(&backfill.numeric_column).unwrap_or("");
        match parse_iso_code(raw).and_then(|code| backfill.codes.get(&code)) {
            Some(alpha3) => derived.push(alpha3.clone()),
            None => {
                unknown.insert(raw.trim().to_string());
            }
        }
    }

    if !unknown.is_empty() {
        return Err(ReaderError::UnmappedIsoCodes {
            source_name: source_name.to_string(),
            codes: unknown.into_iter().collect(),
        });
    }

    // Only touch the records once every code is known to map
    for (record, alpha3) in records.iter_mut().zip(derived) {
        record.insert(backfill.alpha3_column.as_str(), alpha3);
    }
    columns.push(backfill.alpha3_column.clone());
    debug!(source = source_name, "Derived ISO3 codes from numeric codes");

    Ok(())
}

/// Numeric ISO codes may have been written as floats by earlier tooling ("4.0").
fn parse_iso_code(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    // Plain integers are the common case
    if let Ok(code) = raw.parse::<u32>() {
        return Some(code);
    }
    let value: f64 = raw.parse().ok()?;
    (value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64).then(|| value as u32)
}

/// Narrow every record to `retained`, failing if the file lacks any of them.
fn retain_columns(
    columns: &[String],
    records: &[Record],
    retained: &[String],
    source_name: &str,
) -> Result<Vec<Record>, ReaderError> {
    // Report all absent columns, not just the first
    let missing: Vec<String> = retained
        .iter()
        .filter(|column| !columns.contains(column))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(ReaderError::MissingColumns {
            source_name: source_name.to_string(),
            columns: missing,
        });
    }

    Ok(records.iter().map(|record| record.project(retained)).collect())
}
