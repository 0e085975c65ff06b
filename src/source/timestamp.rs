use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("invalid format string '{0}'")]
    InvalidFormat(String),

    #[error("at least one event date format is required")]
    NoDateFormats,

    #[error("failed to parse '{value}' with format '{format}': {source}")]
    ParseError {
        value: String,
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("'{value}' does not match any of the formats: {}", .formats.join(", "))]
    NoMatchingFormat { value: String, formats: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecencyFormat {
    /// Any number, then RFC 3339, then a bare `%Y-%m-%d` date.
    Auto,
    Strptime(String),
    Iso8601,
    Epoch,
    EpochMs,
}

impl RecencyFormat {
    pub fn parse(format: &str) -> Result<Self, TimestampError> {
        let format = match format {
            "auto" => RecencyFormat::Auto,
            "iso8601" => RecencyFormat::Iso8601,
            "epoch" => RecencyFormat::Epoch,
            "epoch_ms" => RecencyFormat::EpochMs,
            other => {
                check_strftime(other)?;
                RecencyFormat::Strptime(other.to_string())
            }
        };
        Ok(format)
    }
}

/// Parsed value of a record's recency marker. Totally ordered, later is greater.
///
/// Bare numbers and instants share one scale: an instant compares as its
/// epoch seconds. A number and an instant landing on the same second are
/// still kept distinct, with the number ordered first.
#[derive(Debug, Clone, Copy)]
pub enum Recency {
    /// A bare finite number, usually epoch seconds as written by the export.
    Number(f64),
    /// A point in time from a date/time string or an explicit epoch format.
    Instant(DateTime<Utc>),
}

impl Recency {
    /// Create a numeric recency. Returns None for NaN or infinite values.
    pub fn number(value: f64) -> Option<Self> {
        // + 0.0 folds -0.0 into 0.0 so both compare equal
        value.is_finite().then_some(Recency::Number(value + 0.0))
    }

    /// Position on the shared epoch-seconds scale.
    fn seconds(&self) -> f64 {
        match self {
            Recency::Number(value) => *value,
            Recency::Instant(dt) => {
                dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
            }
        }
    }
}

impl Ord for Recency {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lexicographic on (seconds, kind, exact value), which keeps the order total
        self.seconds()
            .total_cmp(&other.seconds())
            .then_with(|| match (self, other) {
                (Recency::Number(a), Recency::Number(b)) => a.total_cmp(b),
                (Recency::Instant(a), Recency::Instant(b)) => a.cmp(b),
                (Recency::Number(_), Recency::Instant(_)) => Ordering::Less,
                (Recency::Instant(_), Recency::Number(_)) => Ordering::Greater,
            })
    }
}

impl PartialOrd for Recency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Recency {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Recency {}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recency::Number(value) => write!(f, "{}", value),
            Recency::Instant(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Turns the text of a `timestamp` column into an orderable [`Recency`].
#[derive(Debug, Clone)]
pub struct RecencyParser {
    format: RecencyFormat,
}

impl RecencyParser {
    /// Create a new RecencyParser
    ///
    /// # Arguments
    /// * `format` - One of: 'auto', 'epoch', 'epoch_ms', 'iso8601', or a strptime format string
    pub fn new(format: &str) -> Result<Self, TimestampError> {
        Ok(Self {
            format: RecencyFormat::parse(format)?,
        })
    }

    /// Parse one `timestamp` value. Surrounding whitespace is ignored.
    pub fn parse(&self, value: &str) -> Result<Recency, TimestampError> {
        let value = value.trim();
        let datetime = match &self.format {
            RecencyFormat::Auto => return parse_auto(value),
            RecencyFormat::Iso8601 => parse_iso8601(value)?,
            RecencyFormat::Epoch => parse_epoch(value)?,
            RecencyFormat::EpochMs => parse_epoch_ms(value)?,
            RecencyFormat::Strptime(fmt) => parse_strptime(value, fmt)?,
        };
        Ok(Recency::Instant(datetime))
    }
}

impl Default for RecencyParser {
    fn default() -> Self {
        Self {
            format: RecencyFormat::Auto,
        }
    }
}

/// Parses event dates, trying each configured format in turn.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl DateParser {
    /// Create a new DateParser. Every format is checked up front, so a typo
    /// fails at config load rather than on the first row.
    pub fn new(formats: &[String]) -> Result<Self, TimestampError> {
        if formats.is_empty() {
            return Err(TimestampError::NoDateFormats);
        }
        for format in formats {
            check_strftime(format)?;
        }
        Ok(Self {
            formats: formats.to_vec(),
        })
    }

    /// Parse an event date with the first format that accepts it.
    pub fn parse(&self, value: &str) -> Result<NaiveDate, TimestampError> {
        let value = value.trim();
        // Formats are tried in configured order
        self.formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
            .ok_or_else(|| TimestampError::NoMatchingFormat {
                value: value.to_string(),
                formats: self.formats.clone(),
            })
    }
}

/// Reject format strings chrono cannot interpret.
fn check_strftime(format: &str) -> Result<(), TimestampError> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(TimestampError::InvalidFormat(format.to_string()));
    }
    Ok(())
}

/// Any finite number is taken as-is, so "1622505600.0" and values beyond
/// chrono's range still order numerically. Otherwise try RFC 3339, then
/// `%Y-%m-%d %H:%M:%S`, then a bare `%Y-%m-%d` date.
fn parse_auto(value: &str) -> Result<Recency, TimestampError> {
    if let Some(number) = value.parse::<f64>().ok().and_then(Recency::number) {
        return Ok(number);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Recency::Instant(dt.with_timezone(&Utc)));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(Recency::Instant(Utc.from_utc_datetime(&ndt)));
    }
    // Date-only values sort at midnight UTC
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map(|ndt| Recency::Instant(Utc.from_utc_datetime(&ndt)))
        .map_err(|e| TimestampError::ParseError {
            value: value.to_string(),
            format: "auto".to_string(),
            source: Box::new(e),
        })
}

fn parse_iso8601(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    // RFC 3339 covers ISO 8601 with an explicit offset
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimestampError::ParseError {
            value: value.to_string(),
            format: "iso8601".to_string(),
            source: Box::new(e),
        })
}

fn parse_epoch(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let seconds: i64 =
        value
            .parse()
            .map_err(|e: std::num::ParseIntError| TimestampError::ParseError {
                value: value.to_string(),
                format: "epoch".to_string(),
                source: Box::new(e),
            })?;

    // Typed epoch values must land inside chrono's range
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| out_of_range(value, "epoch"))
}

fn parse_epoch_ms(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let millis: i64 =
        value
            .parse()
            .map_err(|e: std::num::ParseIntError| TimestampError::ParseError {
                value: value.to_string(),
                format: "epoch_ms".to_string(),
                source: Box::new(e),
            })?;

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| out_of_range(value, "epoch_ms"))
}

fn parse_strptime(value: &str, format: &str) -> Result<DateTime<Utc>, TimestampError> {
    // Formats with an offset directive parse to an aware datetime
    if format.contains("%z") || format.contains("%Z") || format.contains("%:z") {
        DateTime::parse_from_str(value, format)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TimestampError::ParseError {
                value: value.to_string(),
                format: format.to_string(),
                source: Box::new(e),
            })
    } else {
        // Naive values are taken as UTC
        NaiveDateTime::parse_from_str(value, format)
            .map(|ndt| Utc.from_utc_datetime(&ndt))
            .map_err(|e| TimestampError::ParseError {
                value: value.to_string(),
                format: format.to_string(),
                source: Box::new(e),
            })
    }
}

fn out_of_range(value: &str, format: &str) -> TimestampError {
    TimestampError::ParseError {
        value: value.to_string(),
        format: format.to_string(),
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "timestamp out of range",
        )),
    }
}
