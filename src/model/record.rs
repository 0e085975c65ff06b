use std::collections::HashMap;

/// One reported event as read from a source file.
///
/// Every column is kept verbatim as text. The identifying, date and recency
/// columns are only interpreted by the consolidation stages, through a
/// [`FieldSchema`](super::FieldSchema).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Value of `column`, or `None` if the column is absent or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Value of `column` exactly as read, blank values included.
    pub fn raw(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Column names and values, in no particular order.
    #[cfg(test)]
    pub(crate) fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set `column`, replacing any previous value.
    pub(crate) fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Copy of this record restricted to `columns`.
    pub(crate) fn project(&self, columns: &[String]) -> Record {
        columns
            .iter()
            .filter_map(|column| {
                self.fields
                    .get(column)
                    .map(|value| (column.clone(), value.clone()))
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_read_as_absent() {
        let record: Record = [("event_id_cnty", "ABC01"), ("notes", "  ")]
            .into_iter()
            .collect();

        assert_eq!(record.get("event_id_cnty"), Some("ABC01"));
        assert_eq!(record.get("notes"), None);
        assert_eq!(record.raw("notes"), Some("  "));
        assert_eq!(record.raw("timestamp"), None);
        assert_eq!(record.get("timestamp"), None);
    }

    #[test]
    fn test_project_keeps_only_listed_columns() {
        let record: Record = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        let projected = record.project(&["c".to_string(), "a".to_string(), "z".to_string()]);

        assert_eq!(projected.fields().count(), 2);
        assert_eq!(projected.get("a"), Some("1"));
        assert_eq!(projected.get("c"), Some("3"));
        assert_eq!(projected.raw("b"), None);
    }
}
