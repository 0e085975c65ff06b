use crate::model::DateRange;
use crate::source::timestamp::TimestampError;
use thiserror::Error;

/// Fatal problems found while validating or merging batches.
///
/// Row numbers are 1-based positions within the batch, not file line numbers.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error(
        "batch {sequence_index} ({source_name}) has no records; check the file naming and contents"
    )]
    EmptyBatch {
        sequence_index: usize,
        source_name: String,
    },

    #[error(
        "ACLED shards must have overlapping dates to avoid data gaps: \
         batch {previous} covers {previous_range} but batch {next} covers {next_range}"
    )]
    CoverageGap {
        previous: usize,
        previous_range: DateRange,
        next: usize,
        next_range: DateRange,
    },

    #[error(
        "batch {sequence_index}, row {row}: missing required field '{field}' (event {})",
        .event_id.as_deref().unwrap_or("unknown")
    )]
    MissingField {
        sequence_index: usize,
        row: usize,
        field: String,
        event_id: Option<String>,
    },

    #[error("batch {sequence_index}, row {row} (event {event_id}): timestamp is not orderable: {source}")]
    MalformedTimestamp {
        sequence_index: usize,
        row: usize,
        event_id: String,
        #[source]
        source: TimestampError,
    },

    #[error(
        "batch {sequence_index}, row {row} (event {}): invalid event date: {source}",
        .event_id.as_deref().unwrap_or("unknown")
    )]
    MalformedDate {
        sequence_index: usize,
        row: usize,
        event_id: Option<String>,
        #[source]
        source: TimestampError,
    },
}
