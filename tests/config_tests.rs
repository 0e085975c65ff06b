use acled_concat::config::{generate::generate_starter_config, load_config, ConfigError, RowOrder};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_generated_config_is_valid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    fs::write(&config_path, generate_starter_config()).unwrap();

    let config = load_config(&config_path).expect("Generated config should be valid");

    assert_eq!(config.fields.event_id, "event_id_cnty");
    assert_eq!(config.fields.date_formats.len(), 3);
    assert_eq!(config.sources.min_files, 2);
    assert_eq!(config.output.filename, "consolidated_acled.csv");
    assert_eq!(config.output.order, RowOrder::EventDate);

    let retained = config.sources.retained_columns.unwrap();
    assert!(retained.contains(&"timestamp".to_string()));
    assert!(retained.contains(&"_orig_fname".to_string()));
}

#[test]
fn test_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    let config_yaml = r#"
fields:
  event_id: data_id
  event_date: date
  timestamp: updated_at
  date_formats: ['%d/%m/%Y']
  timestamp_format: iso8601

sources:
  pattern: '^(?P<seq>\d+)_export\.csv$'
  min_files: 3
  provenance_column: source_file
  retained_columns: [data_id, date, updated_at]
  iso3_backfill:
    codes:
      4: AFG
      356: IND

output:
  filename: merged.csv
  order: first_seen
"#;
    fs::write(&config_path, config_yaml).unwrap();

    let config = load_config(&config_path).unwrap();

    assert_eq!(config.fields.event_id, "data_id");
    assert_eq!(config.fields.timestamp_format, "iso8601");
    assert_eq!(config.sources.min_files, 3);
    assert_eq!(config.sources.provenance_column.as_deref(), Some("source_file"));
    let backfill = config.sources.iso3_backfill.unwrap();
    assert_eq!(backfill.numeric_column, "iso");
    assert_eq!(backfill.alpha3_column, "iso3");
    assert_eq!(backfill.codes.get(&356).map(String::as_str), Some("IND"));
    assert_eq!(config.output.filename, "merged.csv");
    assert_eq!(config.output.order, RowOrder::FirstSeen);
}

#[test]
fn test_env_var_expansion() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    std::env::set_var("ACLED_CONFIG_TEST_OUTPUT", "from_env.csv");
    fs::write(
        &config_path,
        "output:\n  filename: $env{ACLED_CONFIG_TEST_OUTPUT}\n",
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    std::env::remove_var("ACLED_CONFIG_TEST_OUTPUT");

    assert_eq!(config.output.filename, "from_env.csv");
}

#[test]
fn test_invalid_timestamp_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    fs::write(&config_path, "fields:\n  timestamp_format: '%Y-%Q'\n").unwrap();

    let err = load_config(&config_path).unwrap_err();
    match err {
        ConfigError::ValidationList(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("%Y-%Q"));
        }
        other => panic!("expected validation list, got {other:?}"),
    }
}

#[test]
fn test_malformed_yaml_names_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    fs::write(&config_path, "output: [unclosed\n").unwrap();

    let err = load_config(&config_path).unwrap_err();
    assert!(err.to_string().contains("config.yml"));
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_config(&temp_dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
