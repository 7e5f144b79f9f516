//! Configuration Management
//!
//! Provider settings come from command-line flags, the environment and a
//! persistent config file, in that order of precedence.

use crate::error::{ProviderError, ProviderResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_API_KEY: &str = "PAPERSPACE_API_KEY";
pub const ENV_API_HOST: &str = "PAPERSPACE_API_HOST";
pub const ENV_REGION: &str = "PAPERSPACE_REGION";

pub const DEFAULT_API_HOST: &str = "https://api.paperspace.io";

/// Persistent user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API key, if the user chose to store one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API host override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    /// Default region for machines, scripts and networks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("psprov").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a file; missing or malformed files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Set region and save
    pub fn set_region(&mut self, region: &str) -> Result<()> {
        self.region = Some(region.to_string());
        self.save()
    }

    /// Set API host and save
    pub fn set_api_host(&mut self, host: &str) -> Result<()> {
        self.api_host = Some(host.to_string());
        self.save()
    }
}

/// Resolved, read-only provider settings shared by every operation
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_host: String,
    pub region: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("region", &self.region)
            .finish()
    }
}

impl ProviderConfig {
    /// Merge explicit values (flags or environment) over the config file
    pub fn resolve(
        api_key: Option<String>,
        api_host: Option<String>,
        region: Option<String>,
        file: &Config,
    ) -> ProviderResult<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let api_key = non_empty(api_key)
            .or_else(|| non_empty(file.api_key.clone()))
            .ok_or_else(|| {
                ProviderError::Config(format!(
                    "no API key configured; set {} or --api-key",
                    ENV_API_KEY
                ))
            })?;

        let api_host = non_empty(api_host)
            .or_else(|| non_empty(file.api_host.clone()))
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        let parsed = Url::parse(&api_host).map_err(|e| {
            ProviderError::Config(format!("invalid API host \"{}\": {}", api_host, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::Config(format!(
                "API host \"{}\" must use http or https",
                api_host
            )));
        }

        let region = non_empty(region).or_else(|| non_empty(file.region.clone()));

        Ok(Self {
            api_key,
            api_host: api_host.trim_end_matches('/').to_string(),
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_precedence() {
        let file = Config {
            api_key: Some("file-key".to_string()),
            api_host: Some("https://staging.paperspace.io/".to_string()),
            region: Some("Europe (AMS1)".to_string()),
        };

        let config = ProviderConfig::resolve(
            Some("flag-key".to_string()),
            None,
            Some(String::new()),
            &file,
        )
        .unwrap();
        assert_eq!(config.api_key, "flag-key");
        assert_eq!(config.api_host, "https://staging.paperspace.io");
        assert_eq!(config.region.as_deref(), Some("Europe (AMS1)"));
    }

    #[test]
    fn test_resolve_defaults_and_missing_key() {
        let config =
            ProviderConfig::resolve(Some("k".to_string()), None, None, &Config::default()).unwrap();
        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.region, None);

        let err = ProviderConfig::resolve(None, None, None, &Config::default()).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_resolve_rejects_bad_host() {
        for host in ["ftp://example.com", "not a url"] {
            let err = ProviderConfig::resolve(
                Some("k".to_string()),
                Some(host.to_string()),
                None,
                &Config::default(),
            );
            assert!(err.is_err(), "{} accepted", host);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let config =
            ProviderConfig::resolve(Some("secret".to_string()), None, None, &Config::default())
                .unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psprov").join("config.json");

        let config = Config {
            region: Some("West Coast (CA1)".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
