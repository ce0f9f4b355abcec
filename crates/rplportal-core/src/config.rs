//! Application configuration management.
//!
//! Configuration is stored at `~/.config/rplportal/config.json`. The backend
//! location can also come from the environment (`RPLPORTAL_URL`,
//! `RPLPORTAL_ANON_KEY`), which takes precedence over the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::students::{SearchMatch, DEFAULT_PAGE_SIZE};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "rplportal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_URL: &str = "RPLPORTAL_URL";
pub const ENV_ANON_KEY: &str = "RPLPORTAL_ANON_KEY";
pub const ENV_EMAIL: &str = "RPLPORTAL_EMAIL";
pub const ENV_PASSWORD: &str = "RPLPORTAL_PASSWORD";

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub last_email: Option<String>,
    #[serde(default = "default_page_size")]
    pub students_per_page: u32,
    #[serde(default)]
    pub search: SearchMatch,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            last_email: None,
            students_per_page: DEFAULT_PAGE_SIZE,
            search: SearchMatch::default(),
        }
    }
}

/// Where to reach the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Override file values with `RPLPORTAL_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = present(ENV_URL) {
            self.url = Some(url);
        }
        if let Some(key) = present(ENV_ANON_KEY) {
            self.anon_key = Some(key);
        }
    }

    /// Backend url and anon key; both are required.
    pub fn backend(&self) -> Result<BackendSettings> {
        let url = self.url.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let anon_key = self.anon_key.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(BackendSettings {
                url: url.to_string(),
                anon_key: anon_key.to_string(),
            }),
            _ => Err(anyhow::anyhow!(
                "Missing backend configuration: set {} and {} (environment, .env or --url/--anon-key)",
                ENV_URL,
                ENV_ANON_KEY
            )),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.students_per_page.max(1)
    }
}

/// Sign-in credentials supplied through the environment, if both are set.
pub fn env_credentials() -> Option<(String, String)> {
    let email = std::env::var(ENV_EMAIL).ok().filter(|v| !v.trim().is_empty())?;
    let password = std::env::var(ENV_PASSWORD).ok().filter(|v| !v.is_empty())?;
    Some((email, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::{MatchCase, MatchPosition};

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size(), 6);
    }

    #[test]
    fn test_parse_search_options() {
        let json = r#"{"students_per_page": 10, "search": {"case": "sensitive", "position": "prefix"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.search.case, MatchCase::Sensitive);
        assert_eq!(config.search.position, MatchPosition::Prefix);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            url: Some("https://file.example".to_string()),
            anon_key: Some("file-key".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|key| match key {
            ENV_URL => Some("https://env.example".to_string()),
            ENV_ANON_KEY => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.url.as_deref(), Some("https://env.example"));
        assert_eq!(config.anon_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_backend_requires_both_values() {
        let config = Config {
            url: Some("https://x.example".to_string()),
            ..Config::default()
        };
        let err = config.backend().unwrap_err().to_string();
        assert!(err.contains(ENV_URL) && err.contains(ENV_ANON_KEY));

        let config = Config {
            url: Some(" https://x.example ".to_string()),
            anon_key: Some("k".to_string()),
            ..Config::default()
        };
        let backend = config.backend().unwrap();
        assert_eq!(backend.url, "https://x.example");
    }
}
