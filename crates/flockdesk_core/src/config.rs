//! Application configuration.
//!
//! # Responsibility
//! - Load deployment settings from a JSON file with sensible defaults.
//!
//! # Invariants
//! - A missing optional section never fails the load; only unreadable or
//!   malformed files do.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read config file: {err}"),
            Self::Parse(err) => write!(f, "cannot parse config file: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Connection settings for the remote row store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEndpoint {
    pub url: String,
    pub access_token: String,
}

impl RemoteEndpoint {
    /// Remote storage is only attempted when both parts are present.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}

/// Deployment configuration for the data core.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub remote: Option<RemoteEndpoint>,
    /// Base64 of a 32-byte per-deployment envelope key. Absent means the
    /// build-embedded key is used (obfuscation only).
    #[serde(default)]
    pub envelope_key_b64: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: None,
            log_dir: None,
            remote: None,
            envelope_key_b64: None,
        }
    }
}

impl AppConfig {
    /// Local-only configuration rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, RemoteEndpoint};

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(config.remote.is_none());
        assert!(config.envelope_key_b64.is_none());
        assert_eq!(config.data_dir, std::path::PathBuf::from("."));
    }

    #[test]
    fn remote_section_requires_both_parts() {
        let full = RemoteEndpoint {
            url: "https://rows.example.org".to_string(),
            access_token: "token".to_string(),
        };
        assert!(full.is_configured());

        let missing_token = RemoteEndpoint {
            url: "https://rows.example.org".to_string(),
            access_token: "  ".to_string(),
        };
        assert!(!missing_token.is_configured());
    }

    #[test]
    fn full_config_parses() {
        let raw = r#"{
            "data_dir": "/var/lib/flockdesk",
            "log_level": "debug",
            "remote": {
                "url": "https://rows.example.org",
                "access_token": "secret-token"
            }
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.remote.unwrap().is_configured());
    }
}
