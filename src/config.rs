use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::catalog::DEFAULT_BASE_URL;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config directory not found")]
    NoConfigDir,
    #[error("failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Open this show's episodes on startup instead of the show list
    pub startup_show_id: Option<u64>,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Load the user's config file. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(ConfigError::NoConfigDir) => {
                debug!("no config directory, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "showdeck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.catalog.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "catalog.base_url cannot be empty".to_string(),
            ));
        }

        // Strip trailing slash for consistency
        let url = self.catalog.base_url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(
                "catalog.base_url must start with http:// or https://".to_string(),
            ));
        }
        if let Err(e) = url::Url::parse(&url) {
            return Err(ConfigError::ValidationError(format!(
                "catalog.base_url is not a valid URL: {}",
                e
            )));
        }
        self.catalog.base_url = url;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("showdeck-config-tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.catalog.base_url, "https://api.tvmaze.com");
        assert_eq!(config.startup_show_id, None);
    }

    #[test]
    fn test_load_full_config() {
        let path = write_config(
            "full.toml",
            r#"
startup_show_id = 82

[catalog]
base_url = "http://localhost:8080/"
"#,
        );
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.startup_show_id, Some(82));
        assert_eq!(config.catalog.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let path = write_config("empty.toml", "");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.catalog.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let path = write_config("ftp.toml", "[catalog]\nbase_url = \"ftp://example.com\"\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_empty_url() {
        let path = write_config("blank.toml", "[catalog]\nbase_url = \"\"\n");
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let path = write_config("broken.toml", "startup_show_id = \"not a number\"");
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let path = std::env::temp_dir().join("showdeck-config-tests/does-not-exist.toml");
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ReadError(_))
        ));
    }
}
