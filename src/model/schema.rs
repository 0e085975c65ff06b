use crate::config::types::FieldsConfig;
use crate::source::timestamp::{DateParser, Recency, RecencyParser, TimestampError};
use chrono::NaiveDate;

/// Names the identifying, date and recency columns and knows how to parse them.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    event_id: String,
    event_date: String,
    timestamp: String,
    dates: DateParser,
    recency: RecencyParser,
}

impl FieldSchema {
    pub fn from_config(config: &FieldsConfig) -> Result<Self, TimestampError> {
        Ok(Self {
            event_id: config.event_id.clone(),
            event_date: config.event_date.clone(),
            timestamp: config.timestamp.clone(),
            dates: DateParser::new(&config.date_formats)?,
            recency: RecencyParser::new(&config.timestamp_format)?,
        })
    }

    pub fn event_id_column(&self) -> &str {
        &self.event_id
    }

    pub fn event_date_column(&self) -> &str {
        &self.event_date
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp
    }

    pub fn parse_date(&self, value: &str) -> Result<NaiveDate, TimestampError> {
        self.dates.parse(value)
    }

    pub fn parse_recency(&self, value: &str) -> Result<Recency, TimestampError> {
        self.recency.parse(value)
    }
}
