use super::{in_acquisition_order, rows, ConsolidateError, RowRef};
use crate::model::{Batch, FieldSchema, Record};
use crate::source::timestamp::Recency;
use chrono::NaiveDate;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Folds batches into one record per event id, keeping the most recently
/// updated version of each event.
pub struct Merger<'s> {
    schema: &'s FieldSchema,
}

/// A record chosen for the merged output, with the values it was ranked by.
#[derive(Debug, Clone)]
pub struct KeptRecord<'a> {
    pub event_id: &'a str,
    pub event_date: NaiveDate,
    pub recency: Recency,
    /// Sequence index of the batch the record came from
    pub sequence_index: usize,
    pub source_name: &'a str,
    pub record: &'a Record,
}

impl KeptRecord<'_> {
    /// Whether `self` should replace `kept` for the same event id.
    ///
    /// Later timestamps win. Equal timestamps go to the later-acquired batch;
    /// within one batch the first occurrence stays.
    pub fn supersedes(&self, kept: &KeptRecord<'_>) -> bool {
        self.recency > kept.recency
            || (self.recency == kept.recency && self.sequence_index > kept.sequence_index)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub records_seen: usize,
    /// Duplicates that displaced the previously kept record
    pub replaced: usize,
    /// Duplicates dropped in favour of the kept record
    pub discarded: usize,
}

/// Result of a merge: one record per event id, in first-seen order.
///
/// Borrows from the input batches, which are left untouched.
#[derive(Debug, Default)]
pub struct Merged<'a> {
    columns: Vec<String>,
    kept: Vec<KeptRecord<'a>>,
    index: HashMap<&'a str, usize>,
    stats: MergeStats,
}

impl<'a> Merged<'a> {
    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    pub fn get(&self, event_id: &str) -> Option<&KeptRecord<'a>> {
        self.index.get(event_id).map(|&pos| &self.kept[pos])
    }

    /// Kept records in the order their event id was first seen.
    pub fn iter(&self) -> impl Iterator<Item = &KeptRecord<'a>> {
        self.kept.iter()
    }

    /// Union of all input columns, in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    /// Append columns not seen in earlier batches.
    fn extend_columns(&mut self, columns: &[String]) {
        let known: HashSet<&String> = self.columns.iter().collect();
        let added: Vec<String> = columns
            .iter()
            .filter(|column| !known.contains(column))
            .cloned()
            .collect();
        self.columns.extend(added);
    }

    /// Keep `candidate` if its event is new or it supersedes the kept version.
    fn offer(&mut self, candidate: KeptRecord<'a>) {
        self.stats.records_seen += 1;

        match self.index.entry(candidate.event_id) {
            Entry::Vacant(slot) => {
                // First sighting fixes the event's first-seen position
                slot.insert(self.kept.len());
                self.kept.push(candidate);
            }
            Entry::Occupied(slot) => {
                let kept = &mut self.kept[*slot.get()];
                if candidate.supersedes(kept) {
                    // Replace in place so first-seen order is unchanged
                    *kept = candidate;
                    self.stats.replaced += 1;
                } else {
                    self.stats.discarded += 1;
                }
            }
        }
    }
}

impl<'s> Merger<'s> {
    /// Create a new Merger using `schema` to read ids, dates and timestamps
    pub fn new(schema: &'s FieldSchema) -> Self {
        Self { schema }
    }

    /// Merge batches in ascending sequence index order.
    ///
    /// Coverage is not checked here; run [`CoverageValidator`](super::CoverageValidator)
    /// first when gaps matter.
    pub fn merge<'a>(&self, batches: &'a [Batch]) -> Result<Merged<'a>, ConsolidateError> {
        let mut merged = Merged::default();

        for batch in in_acquisition_order(batches) {
            merged.extend_columns(batch.columns());

            let replaced_before = merged.stats.replaced;
            for row in rows(batch) {
                merged.offer(self.inspect(row)?);
            }

            debug!(
                batch = batch.sequence_index(),
                source = batch.source_name(),
                records = batch.len(),
                replaced = merged.stats.replaced - replaced_before,
                unique = merged.len(),
                "Merged batch"
            );
        }

        Ok(merged)
    }

    /// Pull the ranking values out of one row.
    fn inspect<'a>(&self, row: RowRef<'a>) -> Result<KeptRecord<'a>, ConsolidateError> {
        let event_id = row.require(self.schema, self.schema.event_id_column())?;
        let event_date = row.event_date(self.schema)?;
        let timestamp = row.require(self.schema, self.schema.timestamp_column())?;

        let recency = self.schema.parse_recency(timestamp).map_err(|source| {
            ConsolidateError::MalformedTimestamp {
                sequence_index: row.batch.sequence_index(),
                row: row.row,
                event_id: event_id.to_string(),
                source,
            }
        })?;

        Ok(KeptRecord {
            event_id,
            event_date,
            recency,
            sequence_index: row.batch.sequence_index(),
            source_name: row.batch.source_name(),
            record: row.record,
        })
    }
}
