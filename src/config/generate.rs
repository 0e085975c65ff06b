/// Column set kept by the classic ACLED export consolidation.
pub const ACLED_RETAINED_COLUMNS: &[&str] = &[
    "event_id_cnty",
    "iso",
    "iso3",
    "event_date",
    "year",
    "time_precision",
    "event_type",
    "sub_event_type",
    "actor1",
    "assoc_actor_1",
    "inter1",
    "actor2",
    "assoc_actor_2",
    "inter2",
    "interaction",
    "region",
    "country",
    "admin1",
    "admin2",
    "admin3",
    "location",
    "latitude",
    "longitude",
    "geo_precision",
    "source",
    "source_scale",
    "notes",
    "fatalities",
    "timestamp",
    "_orig_fname",
];

pub fn generate_starter_config() -> String {
    let retained: String = ACLED_RETAINED_COLUMNS
        .iter()
        .map(|column| format!("    - {}\n", column))
        .collect();

    format!(
        r#"# =============================================================================
# ACLED-CONCAT CONFIGURATION
# =============================================================================
# Every setting is optional; anything omitted falls back to the default shown.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/acled-concat/config.yml
#   3. /etc/acled-concat/config.yml
#
# Values may reference environment variables as $env{{<VAR_NAME>}}.

# =============================================================================
# FIELDS
# =============================================================================
# Columns that identify, date and rank each event.

fields:
  # Unique event key, shared by every extract an event appears in
  event_id: event_id_cnty
  # Calendar date of the event, used for coverage checks and output order
  event_date: event_date
  # Last-updated marker; the highest value wins when an event is duplicated
  timestamp: timestamp
  # strftime formats tried in order for event dates
  date_formats:
    - '%Y-%m-%d'
    - '%d %B %Y'
    - '%d-%B-%Y'
  # 'auto', 'epoch', 'epoch_ms', 'iso8601', or a strftime format
  timestamp_format: auto

# =============================================================================
# SOURCES
# =============================================================================
# Input CSV files are named NN-acled_<description>.csv, where NN orders the
# downloads (higher numbers are newer downloads).

sources:
  # Regex for source file names; must contain a named capture group 'seq'
  pattern: '^(?P<seq>\d{{2}})-acled.*\.csv$'
  # Minimum number of source files required for a run
  min_files: 2
  # Column recording the source file of every row (null to disable)
  provenance_column: _orig_fname
  # Reduce every file to exactly these columns (null keeps all columns)
  retained_columns:
{retained}  # Older exports only carry numeric ISO country codes. When the
  # alpha3 column is missing, derive it from the numeric one:
  # iso3_backfill:
  #   numeric_column: iso
  #   alpha3_column: iso3
  #   codes:
  #     4: AFG
  #     8: ALB
  iso3_backfill: null

# =============================================================================
# OUTPUT
# =============================================================================

output:
  # Written into the source directory
  filename: consolidated_acled.csv
  # Row order: 'event_date' (then event id), 'event_id', or 'first_seen'
  order: event_date
"#,
        retained = retained
    )
}
