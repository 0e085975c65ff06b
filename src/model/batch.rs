use super::Record;

/// The parsed records of one source file, tagged with its acquisition order.
///
/// Batches are built once by the reader and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based position in acquisition order
    sequence_index: usize,

    /// File the records were read from
    source_name: String,

    /// Column names in source order
    columns: Vec<String>,

    records: Vec<Record>,
}

impl Batch {
    /// Create a new batch from already parsed records.
    pub fn new(
        sequence_index: usize,
        source_name: impl Into<String>,
        columns: Vec<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            sequence_index,
            source_name: source_name.into(),
            columns,
            records,
        }
    }

    /// Build a batch without a source header; columns are the sorted union
    /// of the records' field names.
    #[cfg(test)]
    pub(crate) fn from_records(sequence_index: usize, records: Vec<Record>) -> Self {
        let columns: std::collections::BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.fields().map(|(name, _)| name))
            .collect();
        let columns = columns.into_iter().map(str::to_string).collect();

        Self::new(
            sequence_index,
            format!("batch-{}", sequence_index),
            columns,
            records,
        )
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
