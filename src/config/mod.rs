mod schema;

pub use schema::{validate_config, Config, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (~/.config/ethics-grade/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("ethics-grade"))
}

/// Get the default config file path (~/.config/ethics-grade/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// With `path` set, the file must exist. Without it, the default path is
/// tried and a missing file means built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or has unknown keys
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            path
        }
        None => {
            let path = get_config_path()?;
            if !path.exists() {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            path
        }
    };

    read_config(&config_path)
}

fn read_config(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_config() {
        let file = write_config(
            "base_url: \"https://ethics.example.com\"\nrequest_timeout_secs: 5\n",
        );
        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "https://ethics.example.com");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.default_model, DEFAULT_MODEL);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = load_config(Some(missing)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_empty_file_means_defaults() {
        let file = write_config("\n");
        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let file = write_config("request_timeout_secs: [1, 2\n");
        let err = load_config(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn test_default_path_layout() {
        let path = get_config_path().unwrap();
        assert!(path.ends_with(".config/ethics-grade/config.yaml"));
    }
}
