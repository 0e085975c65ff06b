use crate::config::types::RowOrder;
use crate::consolidate::{KeptRecord, Merged};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("failed to write '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to save '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kept records arranged in the requested output order.
pub fn ordered_rows<'m, 'a>(merged: &'m Merged<'a>, order: RowOrder) -> Vec<&'m KeptRecord<'a>> {
    let mut rows: Vec<&KeptRecord<'a>> = merged.iter().collect();
    match order {
        RowOrder::FirstSeen => {}
        RowOrder::EventId => rows.sort_by(|a, b| a.event_id.cmp(b.event_id)),
        RowOrder::EventDate => rows.sort_by(|a, b| {
            a.event_date
                .cmp(&b.event_date)
                .then_with(|| a.event_id.cmp(b.event_id))
        }),
    }
    rows
}

/// Write the merged records as CSV to `path`, returning the row count.
///
/// Rows go to a `.tmp` sibling first, which is renamed over `path` only once
/// everything is written. On failure `path` is left as it was.
pub fn write_csv(path: &Path, merged: &Merged<'_>, order: RowOrder) -> Result<usize, WriterError> {
    let tmp_path = path.with_extension("tmp");

    let result = write_tmp(&tmp_path, path, merged, order).and_then(|rows| {
        fs::rename(&tmp_path, path).map_err(|source| WriterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(rows)
    });

    match result {
        Ok(rows) => {
            info!(path = %path.display(), rows, "Wrote consolidated file");
            Ok(rows)
        }
        Err(e) => {
            // Best effort, the original error is the one worth reporting
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

/// Write the CSV into `tmp_path`. Errors name the final `path`.
fn write_tmp(
    tmp_path: &Path,
    path: &Path,
    merged: &Merged<'_>,
    order: RowOrder,
) -> Result<usize, WriterError> {
    let file = File::create(tmp_path).map_err(|source| WriterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = write_to(&file, merged, order).map_err(|source| WriterError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    // Make sure the bytes are on disk before the rename makes them visible
    file.sync_all().map_err(|source| WriterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(rows)
}

/// Write the merged records as CSV to any writer.
///
/// The header is the merged column union; fields a record lacks are left empty.
pub fn write_to<W: Write>(
    output: W,
    merged: &Merged<'_>,
    order: RowOrder,
) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(output);
    let columns = merged.columns();
    writer.write_record(columns)?;

    let rows = ordered_rows(merged, order);
    for kept in &rows {
        writer.write_record(
            columns
                .iter()
                .map(|column| kept.record.raw(column).unwrap_or("")),
        )?;
    }

    writer.flush()?;
    Ok(rows.len())
}
