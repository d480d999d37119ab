use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use tracing::warn;

use crate::ai::explain::DEFAULT_MAX_RETRIES;
use crate::error::VerseError;

pub const DEFAULT_PRIMARY_VERSION: &str = "RUSV";
pub const DEFAULT_SECONDARY_VERSION: &str = "NIV";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub telegram_token: Option<String>,
    pub chat_id: Option<String>,
    pub google_api_key: Option<String>,
    pub ai_explain_max_retries: Option<u32>,
    pub primary_version: Option<String>,
    pub secondary_version: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            primary_version: Some(DEFAULT_PRIMARY_VERSION.to_string()),
            secondary_version: Some(DEFAULT_SECONDARY_VERSION.to_string()),
            ..Self::default()
        }
    }

    /// Config file (if any) with environment variables on top.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Ok(Self::load_from(&config_path)?.with_env(|key| std::env::var(key).ok()))
    }

    /// Read a config file; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        Ok(config.without_blanks())
    }

    /// Blank strings in the file count as unset.
    fn without_blanks(mut self) -> Self {
        for field in [
            &mut self.telegram_token,
            &mut self.chat_id,
            &mut self.google_api_key,
            &mut self.primary_version,
            &mut self.secondary_version,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }

    /// Override fields from the environment. Env wins over the file, the
    /// same way API keys are picked up everywhere else.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(token) = get("TG_TOKEN") {
            self.telegram_token = Some(token);
        }
        if let Some(chat_id) = get("CHAT_ID") {
            self.chat_id = Some(chat_id);
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.google_api_key = Some(key);
        }
        if let Some(retries) = get("AI_EXPLAIN_MAX_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) if n > 0 => self.ai_explain_max_retries = Some(n),
                _ => {
                    warn!(
                        "Ignoring AI_EXPLAIN_MAX_RETRIES={:?}, using {}",
                        retries, DEFAULT_MAX_RETRIES
                    );
                    self.ai_explain_max_retries = None;
                }
            }
        }
        if let Some(version) = get("PRIMARY_VERSION") {
            self.primary_version = Some(version);
        }
        if let Some(version) = get("SECONDARY_VERSION") {
            self.secondary_version = Some(version);
        }
        self
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("daily-verse").join("config.json"))
    }

    pub fn primary_version(&self) -> &str {
        self.primary_version.as_deref().unwrap_or(DEFAULT_PRIMARY_VERSION)
    }

    pub fn secondary_version(&self) -> &str {
        self.secondary_version.as_deref().unwrap_or(DEFAULT_SECONDARY_VERSION)
    }

    pub fn max_retries(&self) -> u32 {
        match self.ai_explain_max_retries {
            Some(n) if n > 0 => n,
            _ => DEFAULT_MAX_RETRIES,
        }
    }

    /// Bot token and destination chat, both required for delivery.
    pub fn telegram(&self) -> std::result::Result<(&str, &str), VerseError> {
        let token = self
            .telegram_token
            .as_deref()
            .ok_or(VerseError::MissingConfig("TG_TOKEN"))?;
        let chat_id = self
            .chat_id
            .as_deref()
            .ok_or(VerseError::MissingConfig("CHAT_ID"))?;
        Ok((token, chat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.primary_version(), "RUSV");
        assert_eq!(config.secondary_version(), "NIV");
        assert_eq!(config.max_retries(), 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.chat_id = Some("-100500".to_string());
        config.ai_explain_max_retries = Some(5);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.max_retries(), 5);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"secondary_version": "KJV"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.secondary_version(), "KJV");
        assert_eq!(config.primary_version(), "RUSV");
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_blank_file_values_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"google_api_key": "", "chat_id": "  ", "primary_version": "", "telegram_token": "123:abc"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.google_api_key.is_none());
        assert!(config.chat_id.is_none());
        assert_eq!(config.primary_version(), "RUSV");
        assert_eq!(config.telegram_token.as_deref(), Some("123:abc"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::new();
        config.google_api_key = Some("from-file".to_string());

        let config = config.with_env(env(&[
            ("GOOGLE_API_KEY", "from-env"),
            ("TG_TOKEN", "123:abc"),
            ("CHAT_ID", "42"),
            ("PRIMARY_VERSION", "SYNOD"),
            ("AI_EXPLAIN_MAX_RETRIES", "4"),
        ]));

        assert_eq!(config.google_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.primary_version(), "SYNOD");
        assert_eq!(config.max_retries(), 4);
        assert_eq!(config.telegram().unwrap(), ("123:abc", "42"));
    }

    #[test]
    fn test_blank_env_is_absent() {
        let config = Config::new().with_env(env(&[("GOOGLE_API_KEY", "  ")]));
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_bad_retry_count_falls_back() {
        for value in ["0", "-2", "three"] {
            let config = Config::new().with_env(env(&[("AI_EXPLAIN_MAX_RETRIES", value)]));
            assert_eq!(config.max_retries(), DEFAULT_MAX_RETRIES);
        }
    }

    #[test]
    fn test_telegram_requires_both_values() {
        let config = Config::new().with_env(env(&[("TG_TOKEN", "123:abc")]));
        match config.telegram() {
            Err(VerseError::MissingConfig(name)) => assert_eq!(name, "CHAT_ID"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
