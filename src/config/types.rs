use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fields: FieldsConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which columns identify, date and rank each event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsConfig {
    #[serde(default = "default_event_id")]
    pub event_id: String,
    #[serde(default = "default_event_date")]
    pub event_date: String,
    #[serde(default = "default_timestamp")]
    pub timestamp: String,
    /// strftime formats tried in order when reading event dates
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// 'auto', 'epoch', 'epoch_ms', 'iso8601', or a strftime format
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            event_id: default_event_id(),
            event_date: default_event_date(),
            timestamp: default_timestamp(),
            date_formats: default_date_formats(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_event_id() -> String {
    "event_id_cnty".to_string()
}

fn default_event_date() -> String {
    "event_date".to_string()
}

fn default_timestamp() -> String {
    "timestamp".to_string()
}

fn default_date_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d".to_string(),
        "%d %B %Y".to_string(),
        "%d-%B-%Y".to_string(),
    ]
}

fn default_timestamp_format() -> String {
    "auto".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// File name regex; must contain a named capture group 'seq'
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default = "default_min_files")]
    pub min_files: usize,
    /// Column recording which file each record came from
    #[serde(default = "default_provenance_column")]
    pub provenance_column: Option<String>,
    /// When set, records are reduced to exactly these columns
    #[serde(default)]
    pub retained_columns: Option<Vec<String>>,
    #[serde(default)]
    pub iso3_backfill: Option<IsoBackfillConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            min_files: default_min_files(),
            provenance_column: default_provenance_column(),
            retained_columns: None,
            iso3_backfill: None,
        }
    }
}

fn default_pattern() -> String {
    r"^(?P<seq>\d{2})-acled.*\.csv$".to_string()
}

fn default_min_files() -> usize {
    2
}

fn default_provenance_column() -> Option<String> {
    Some("_orig_fname".to_string())
}

/// Derives three-letter country codes for files that only carry numeric ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsoBackfillConfig {
    #[serde(default = "default_numeric_column")]
    pub numeric_column: String,
    #[serde(default = "default_alpha3_column")]
    pub alpha3_column: String,
    pub codes: BTreeMap<u32, String>,
}

fn default_numeric_column() -> String {
    "iso".to_string()
}

fn default_alpha3_column() -> String {
    "iso3".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default)]
    pub order: RowOrder,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            order: RowOrder::default(),
        }
    }
}

fn default_filename() -> String {
    "consolidated_acled.csv".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// By event date, then event id
    #[default]
    EventDate,
    EventId,
    /// Order in which each event id was first encountered
    FirstSeen,
}
