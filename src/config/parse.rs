use super::types::*;
use crate::config::{env_var_pattern, expand_env_vars};
use crate::model::FieldSchema;
use crate::source::discovery::SourceNamePattern;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate a config from YAML text. Blank text yields the defaults.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml)?;

    let config: Config = if yaml.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&yaml)?
    };

    validate_config(&config)?;
    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let mut unexpanded_vars: Vec<String> = env_var_pattern()
        .captures_iter(yaml_string)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=...\n\
             2. Replace $env{{{0}}} in the config file with an actual value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables\n\
             2. Replace the variables in the config file with actual values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_fields(&config.fields, &mut errors);
    validate_sources(&config.sources, &mut errors);
    validate_output(&config.output, &mut errors);

    // The output is written next to the sources, so it must not look like one
    if let Ok(pattern) = SourceNamePattern::new(&config.sources.pattern) {
        if pattern.matches(config.output.filename.trim()) {
            errors.push(format!(
                "output.filename '{}' matches sources.pattern and would be read as a source on the next run",
                config.output.filename.trim()
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_fields(fields: &FieldsConfig, errors: &mut Vec<String>) {
    let names = [
        ("fields.event_id", &fields.event_id),
        ("fields.event_date", &fields.event_date),
        ("fields.timestamp", &fields.timestamp),
    ];

    let mut seen = HashSet::new();
    for (key, name) in names {
        if name.trim().is_empty() {
            errors.push(format!("{}: column name cannot be empty", key));
        } else if !seen.insert(name.as_str()) {
            errors.push(format!(
                "{}: column '{}' is already used by another required field",
                key, name
            ));
        }
    }

    if let Err(e) = FieldSchema::from_config(fields) {
        errors.push(format!("fields: {}", e));
    }
}

fn validate_sources(sources: &SourcesConfig, errors: &mut Vec<String>) {
    if let Err(e) = SourceNamePattern::new(&sources.pattern) {
        errors.push(format!("sources.pattern: {}", e));
    }

    if sources.min_files == 0 {
        errors.push("sources.min_files must be at least 1".to_string());
    }

    if let Some(column) = &sources.provenance_column {
        if column.trim().is_empty() {
            errors.push("sources.provenance_column cannot be empty (use null to disable)".to_string());
        }
    }

    if let Some(columns) = &sources.retained_columns {
        if columns.is_empty() {
            errors.push("sources.retained_columns must list at least one column".to_string());
        }
        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.as_str()) {
                errors.push(format!(
                    "sources.retained_columns: duplicate column '{}'",
                    column
                ));
            }
        }
    }

    if let Some(backfill) = &sources.iso3_backfill {
        if backfill.numeric_column == backfill.alpha3_column {
            errors.push(
                "sources.iso3_backfill: numeric_column and alpha3_column must differ".to_string(),
            );
        }
        for (code, alpha3) in &backfill.codes {
            if alpha3.len() != 3 || !alpha3.chars().all(|c| c.is_ascii_uppercase()) {
                errors.push(format!(
                    "sources.iso3_backfill.codes[{}]: '{}' is not a three-letter code",
                    code, alpha3
                ));
            }
        }
    }
}

fn validate_output(output: &OutputConfig, errors: &mut Vec<String>) {
    let name = output.filename.trim();
    if name.is_empty() {
        errors.push("output.filename cannot be empty".to_string());
        return;
    }
    if name.contains('/') || name.contains('\\') {
        errors.push(format!(
            "output.filename '{}' must be a file name, not a path",
            name
        ));
    }
    if !name.ends_with(".csv") || name == ".csv" {
        errors.push(format!("output.filename '{}' must end in .csv", name));
    }
}
