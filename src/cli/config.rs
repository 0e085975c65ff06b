use crate::config::generate::generate_starter_config;
use crate::config::user_config_path;
use std::fs;
use std::path::{Path, PathBuf};

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = user_config_path()
        .unwrap_or_else(|| PathBuf::from("/etc/acled-concat/config.yml"));
    write_config(&config_content, &config_path)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// Write `content` to `path`, creating parent directories. Never overwrites.
pub fn write_config(content: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!(
            "Config file already exists at {}. Remove it first or use --stdout to print the config",
            path.display()
        )
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create directory {}: {}", parent.display(), e))?;
    }

    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_config_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/config.yml");

        write_config("output:\n  order: event_id\n", &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "output:\n  order: event_id\n"
        );
    }

    #[test]
    fn test_write_config_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "existing").unwrap();

        let err = write_config("new", &path).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
    }
}
