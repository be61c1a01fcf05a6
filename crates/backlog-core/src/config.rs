//! Configuration management for backlog-tools.
//!
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/backlog-tools/config.toml`
//! - **Windows**: `%APPDATA%\backlog-tools\config.toml`
//!
//! The API key is not part of the config file. It comes from the
//! `BACKLOG_API_KEY` environment variable or the OS keychain.
//!
//! # Example
//!
//! ```ignore
//! use backlog_core::config::Config;
//!
//! let mut config = Config::load()?;
//! config.set("backlog.space", "acme")?;
//! config.set("backlog.domain", "backlog.com")?;
//! config.save()?;
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "backlog-tools";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlog: Option<BacklogConfig>,
}

/// Backlog space configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogConfig {
    /// Space key, the subdomain of the Backlog URL
    pub space: String,
    /// Backlog domain (`backlog.jp` or `backlog.com`)
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Default project id for searches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    /// Explicit endpoint, overrides space and domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_domain() -> String {
    "backlog.jp".to_string()
}

impl BacklogConfig {
    /// The API endpoint base, e.g. `https://acme.backlog.jp`.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", self.space, self.domain),
        }
    }
}

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved");
        Ok(())
    }

    /// Check if a Backlog space is configured.
    pub fn is_configured(&self) -> bool {
        self.backlog
            .as_ref()
            .is_some_and(|b| !b.space.is_empty() || b.base_url.is_some())
    }

    /// The Backlog section, or a config error when it is missing.
    pub fn backlog(&self) -> Result<&BacklogConfig> {
        self.backlog
            .as_ref()
            .filter(|_| self.is_configured())
            .ok_or_else(|| {
                Error::Config(
                    "Backlog space not configured, \
                     run `backlog config set backlog.space <SPACE>`"
                        .to_string(),
                )
            })
    }

    /// Set a configuration value by key path (`backlog.<field>`).
    ///
    /// The section is only created once the key and value are valid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let field = backlog_field(key)?;
        let project_id = match field {
            "project_id" | "project" => Some(value.parse::<u64>().map_err(|_| {
                Error::Config(format!("Project id must be numeric, got '{}'", value))
            })?),
            "space" | "domain" | "host" | "base_url" | "url" => None,
            _ => {
                return Err(Error::Config(format!(
                    "Unknown Backlog config field: {}",
                    field
                )))
            }
        };

        let config = self.backlog.get_or_insert_with(|| BacklogConfig {
            space: String::new(),
            domain: default_domain(),
            project_id: None,
            base_url: None,
        });

        match field {
            "space" => config.space = value.to_string(),
            "domain" | "host" => config.domain = value.to_string(),
            "base_url" | "url" => config.base_url = Some(value.to_string()),
            _ => config.project_id = project_id,
        }

        Ok(())
    }

    /// Get a configuration value by key path (`backlog.<field>`).
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let field = backlog_field(key)?;
        let Some(config) = &self.backlog else {
            return Ok(None);
        };

        match field {
            "space" => Ok(Some(config.space.clone())),
            "domain" | "host" => Ok(Some(config.domain.clone())),
            "project_id" | "project" => Ok(config.project_id.map(|id| id.to_string())),
            "base_url" | "url" => Ok(config.base_url.clone()),
            _ => Err(Error::Config(format!(
                "Unknown Backlog config field: {}",
                field
            ))),
        }
    }
}

fn backlog_field(key: &str) -> Result<&str> {
    match key.split_once('.') {
        Some(("backlog", field)) if !field.contains('.') => Ok(field),
        Some((section, _)) if section != "backlog" => {
            Err(Error::Config(format!("Unknown config section: {}", section)))
        }
        _ => Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: backlog.field",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.backlog.is_none());
        assert!(!config.is_configured());
        assert!(config.backlog().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();
        config.set("backlog.space", "acme").unwrap();
        config.set("backlog.project", "42").unwrap();

        assert_eq!(config.get("backlog.space").unwrap(), Some("acme".to_string()));
        assert_eq!(
            config.get("backlog.domain").unwrap(),
            Some("backlog.jp".to_string())
        );
        assert_eq!(config.get("backlog.project_id").unwrap(), Some("42".to_string()));
        assert_eq!(config.get("backlog.base_url").unwrap(), None);
        assert!(config.is_configured());
    }

    #[test]
    fn test_invalid_key() {
        let mut config = Config::default();

        assert!(config.set("invalid", "value").is_err());
        assert!(config.set("backlog.too.deep", "value").is_err());
        assert!(config.set("project.url", "value").is_err());
        assert!(config.set("backlog.project_id", "abc").is_err());
        assert!(config.set("backlog.bogus", "value").is_err());

        // Rejected values leave no section behind
        assert!(config.backlog.is_none());
        assert_eq!(config.get("backlog.space").unwrap(), None);

        config.set("backlog.space", "acme").unwrap();
        assert!(config.get("backlog.unknown_field").is_err());
    }

    #[test]
    fn test_endpoint() {
        let mut config = Config::default();
        config.set("backlog.space", "acme").unwrap();
        config.set("backlog.domain", "backlog.com").unwrap();
        assert_eq!(config.backlog().unwrap().endpoint(), "https://acme.backlog.com");

        config.set("backlog.url", "http://localhost:8080/").unwrap();
        assert_eq!(config.backlog().unwrap().endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config::default();
        config.set("backlog.space", "acme").unwrap();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[backlog]"));
        assert!(contents.contains("space = \"acme\""));
        assert!(!contents.contains("project_id"));

        let loaded = Config::load_from(&path).unwrap();
        let backlog = loaded.backlog.unwrap();
        assert_eq!(backlog.space, "acme");
        assert_eq!(backlog.domain, "backlog.jp");
    }

    #[test]
    fn test_load_nonexistent() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(config.backlog.is_none());
    }

    #[test]
    fn test_load_applies_default_domain() {
        let config: Config = toml::from_str("[backlog]\nspace = \"acme\"\n").unwrap();
        assert_eq!(config.backlog.unwrap().domain, "backlog.jp");
    }
}
