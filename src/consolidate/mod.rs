pub mod error;
pub mod merge;
pub mod validate;

use crate::model::{Batch, FieldSchema, Record};
use chrono::NaiveDate;

pub use error::ConsolidateError;
pub use merge::{KeptRecord, MergeStats, Merged, Merger};
pub use validate::CoverageValidator;

/// Validate coverage, then merge.
///
/// Convenience for callers that want both steps; each is usable on its own.
pub fn consolidate<'a>(
    batches: &'a [Batch],
    schema: &FieldSchema,
) -> Result<Merged<'a>, ConsolidateError> {
    CoverageValidator::new(schema).validate(batches)?;
    Merger::new(schema).merge(batches)
}

/// Batches sorted by ascending sequence index. Stable, so equal indices keep
/// their given order.
pub(crate) fn in_acquisition_order(batches: &[Batch]) -> Vec<&Batch> {
    let mut ordered: Vec<&Batch> = batches.iter().collect();
    ordered.sort_by_key(|batch| batch.sequence_index());
    ordered
}

/// Position of a record inside its batch, for error reporting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowRef<'b> {
    pub batch: &'b Batch,
    pub row: usize,
    pub record: &'b Record,
}

impl<'b> RowRef<'b> {
    pub fn event_id_hint(&self, schema: &FieldSchema) -> Option<String> {
        self.record
            .get(schema.event_id_column())
            .map(str::to_string)
    }

    pub fn require(&self, schema: &FieldSchema, column: &str) -> Result<&'b str, ConsolidateError> {
        self.record
            .get(column)
            .ok_or_else(|| ConsolidateError::MissingField {
                sequence_index: self.batch.sequence_index(),
                row: self.row,
                field: column.to_string(),
                event_id: self.event_id_hint(schema),
            })
    }

    pub fn event_date(&self, schema: &FieldSchema) -> Result<NaiveDate, ConsolidateError> {
        let value = self.require(schema, schema.event_date_column())?;
        schema
            .parse_date(value)
            .map_err(|source| ConsolidateError::MalformedDate {
                sequence_index: self.batch.sequence_index(),
                row: self.row,
                event_id: self.event_id_hint(schema),
                source,
            })
    }
}

/// Rows of a batch with their 1-based position.
pub(crate) fn rows(batch: &Batch) -> impl Iterator<Item = RowRef<'_>> {
    batch
        .records()
        .iter()
        .enumerate()
        .map(move |(offset, record)| RowRef {
            batch,
            row: offset + 1,
            record,
        })
}


#[cfg(test)]
mod tests {
    use super::test_support::{batch, schema};
    use super::*;

    #[test]
    fn test_consolidate_runs_validation_first() {
        let batches = vec![
            batch(1, &[("E1", "2021-01-01", "1"), ("E2", "2021-03-01", "1")]),
            batch(2, &[("E3", "2021-04-01", "1"), ("E4", "2021-05-01", "1")]),
        ];

        let result = consolidate(&batches, &schema());
        assert!(matches!(
            result,
            Err(ConsolidateError::CoverageGap {
                previous: 1,
                next: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_consolidate_merges_valid_batches() {
        let batches = vec![
            batch(1, &[("E1", "2021-06-01", "10"), ("E2", "2021-07-01", "5")]),
            batch(2, &[("E1", "2021-06-01", "20"), ("E3", "2021-06-15", "1")]),
        ];

        let merged = consolidate(&batches, &schema()).unwrap();
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_acquisition_order_sorts_by_sequence_index() {
        let batches = vec![
            batch(3, &[("E1", "2021-06-01", "1")]),
            batch(1, &[("E2", "2021-06-01", "1")]),
            batch(2, &[("E3", "2021-06-01", "1")]),
        ];

        let order: Vec<usize> = in_acquisition_order(&batches)
            .iter()
            .map(|b| b.sequence_index())
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
}
