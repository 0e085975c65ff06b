use super::{in_acquisition_order, rows, ConsolidateError};
use crate::model::{Batch, DateRange, FieldSchema};
use tracing::{debug, info};

/// Checks that each batch's event dates overlap those of the batch acquired
/// just before it.
///
/// Only adjacent pairs are compared. A batch nested inside its neighbours'
/// ranges can still hide a gap elsewhere; that is not detected here.
pub struct CoverageValidator<'s> {
    schema: &'s FieldSchema,
}

impl<'s> CoverageValidator<'s> {
    /// Create a new CoverageValidator reading event dates through `schema`
    pub fn new(schema: &'s FieldSchema) -> Self {
        Self { schema }
    }

    /// Fails on the first empty batch, unreadable event date, or adjacent
    /// pair whose date ranges share no day.
    pub fn validate(&self, batches: &[Batch]) -> Result<(), ConsolidateError> {
        let ordered = in_acquisition_order(batches);

        // Empty batches fail before any date is parsed
        if let Some(empty) = ordered.iter().find(|batch| batch.is_empty()) {
            return Err(ConsolidateError::EmptyBatch {
                sequence_index: empty.sequence_index(),
                source_name: empty.source_name().to_string(),
            });
        }

        let ranges = ordered
            .iter()
            .map(|batch| Ok((batch.sequence_index(), self.date_range(batch)?)))
            .collect::<Result<Vec<_>, ConsolidateError>>()?;

        for pair in ranges.windows(2) {
            let (previous, previous_range) = pair[0];
            let (next, next_range) = pair[1];

            if !previous_range.overlaps(&next_range) {
                return Err(ConsolidateError::CoverageGap {
                    previous,
                    previous_range,
                    next,
                    next_range,
                });
            }

            debug!(
                previous,
                next,
                previous_range = %previous_range,
                next_range = %next_range,
                "Adjacent batches overlap"
            );
        }

        info!(batches = ranges.len(), "Date coverage validated");
        Ok(())
    }

    /// `[min(event_date), max(event_date)]` over the batch's records.
    pub fn date_range(&self, batch: &Batch) -> Result<DateRange, ConsolidateError> {
        let mut range: Option<DateRange> = None;

        for row in rows(batch) {
            let date = row.event_date(self.schema)?;
            match range.as_mut() {
                Some(range) => range.include(date),
                None => range = Some(DateRange::single(date)),
            }
        }

        range.ok_or_else(|| ConsolidateError::EmptyBatch {
            sequence_index: batch.sequence_index(),
            source_name: batch.source_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::test_support::{batch, event, schema};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_overlapping_batches_pass() {
        let schema = schema();
        let batches = vec![
            batch(1, &[("E1", "2021-06-01", "10"), ("E2", "2021-07-01", "5")]),
            batch(2, &[("E1", "2021-06-01", "20"), ("E3", "2021-06-15", "1")]),
        ];

        CoverageValidator::new(&schema).validate(&batches).unwrap();
    }

    #[test]
    fn test_single_shared_day_passes() {
        let schema = schema();
        let batches = vec![
            batch(1, &[("E1", "2021-01-01", "1"), ("E2", "2021-03-01", "1")]),
            batch(2, &[("E3", "2021-03-01", "1"), ("E4", "2021-05-01", "1")]),
        ];

        CoverageValidator::new(&schema).validate(&batches).unwrap();
    }

    #[test]
    fn test_disjoint_batches_report_gap() {
        let schema = schema();
        let batches = vec![
            batch(1, &[("E1", "2021-01-01", "1"), ("E2", "2021-03-01", "1")]),
            batch(2, &[("E3", "2021-04-01", "1"), ("E4", "2021-05-01", "1")]),
        ];

        let err = CoverageValidator::new(&schema)
            .validate(&batches)
            .unwrap_err();

        match err {
            ConsolidateError::CoverageGap {
                previous,
                previous_range,
                next,
                next_range,
            } => {
                assert_eq!(previous, 1);
                assert_eq!(next, 2);
                assert_eq!(previous_range, DateRange::new(d("2021-01-01"), d("2021-03-01")));
                assert_eq!(next_range, DateRange::new(d("2021-04-01"), d("2021-05-01")));
            }
            other => panic!("expected coverage gap, got {other:?}"),
        }
    }

    #[test]
    fn test_gap_message_names_both_batches() {
        let schema = schema();
        let batches = vec![
            batch(1, &[("E1", "2020-01-01", "1"), ("E2", "2020-12-31", "1")]),
            batch(2, &[("E3", "2099-12-31", "1")]),
        ];

        let message = CoverageValidator::new(&schema)
            .validate(&batches)
            .unwrap_err()
            .to_string();

        assert!(message.contains("shards must have overlapping dates"));
        assert!(message.contains("batch 1 covers [2020-01-01, 2020-12-31]"));
        assert!(message.contains("batch 2 covers [2099-12-31, 2099-12-31]"));
    }

    #[test]
    fn test_only_adjacent_pairs_are_checked() {
        // 1 and 3 share no day, but each overlaps 2
        let schema = schema();
        let batches = vec![
            batch(1, &[("E1", "2021-01-01", "1"), ("E2", "2021-02-01", "1")]),
            batch(2, &[("E3", "2021-02-01", "1"), ("E4", "2021-03-01", "1")]),
            batch(3, &[("E5", "2021-03-01", "1"), ("E6", "2021-04-01", "1")]),
        ];

        CoverageValidator::new(&schema).validate(&batches).unwrap();
    }

    #[test]
    fn test_pairs_follow_sequence_index_not_slice_order() {
        let schema = schema();
        let batches = vec![
            batch(2, &[("E3", "2021-02-01", "1"), ("E4", "2021-03-01", "1")]),
            batch(3, &[("E5", "2021-03-01", "1")]),
            batch(1, &[("E1", "2021-01-01", "1"), ("E2", "2021-02-01", "1")]),
        ];

        CoverageValidator::new(&schema).validate(&batches).unwrap();
    }

    #[test]
    fn test_empty_batch_fails_regardless_of_ranges() {
        let schema = schema();
        let batches = vec![
            batch(1, &[("E1", "2021-01-01", "1")]),
            batch(2, &[("E2", "2030-01-01", "1")]),
            Batch::from_records(3, vec![]),
        ];

        let err = CoverageValidator::new(&schema)
            .validate(&batches)
            .unwrap_err();
        assert!(matches!(
            err,
            ConsolidateError::EmptyBatch {
                sequence_index: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_single_batch_passes() {
        let schema = schema();
        let batches = vec![batch(1, &[("E1", "2021-01-01", "1")])];
        CoverageValidator::new(&schema).validate(&batches).unwrap();
    }

    #[test]
    fn test_missing_event_date_is_reported() {
        let schema = schema();
        let mut records = vec![event("E1", "2021-01-01", "1")];
        records.push(
            [("event_id_cnty", "E2"), ("timestamp", "1")]
                .into_iter()
                .collect(),
        );
        let batches = vec![Batch::from_records(1, records)];

        let err = CoverageValidator::new(&schema)
            .validate(&batches)
            .unwrap_err();
        match err {
            ConsolidateError::MissingField {
                sequence_index,
                row,
                field,
                event_id,
            } => {
                assert_eq!(sequence_index, 1);
                assert_eq!(row, 2);
                assert_eq!(field, "event_date");
                assert_eq!(event_id.as_deref(), Some("E2"));
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_event_date_is_reported() {
        let schema = schema();
        let batches = vec![batch(1, &[("E1", "sometime in June", "1")])];

        let err = CoverageValidator::new(&schema)
            .validate(&batches)
            .unwrap_err();
        assert!(matches!(
            err,
            ConsolidateError::MalformedDate { row: 1, .. }
        ));
    }

    #[test]
    fn test_date_range_accepts_long_month_format() {
        let schema = schema();
        let b = batch(
            1,
            &[("E1", "15 June 2021", "1"), ("E2", "2021-06-01", "1")],
        );

        let range = CoverageValidator::new(&schema).date_range(&b).unwrap();
        assert_eq!(range, DateRange::new(d("2021-06-01"), d("2021-06-15")));
    }
}
