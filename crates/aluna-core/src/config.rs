use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Aluna client.
///
/// Loaded from `~/.aluna/config.toml` by default. Each section corresponds
/// to one subsystem of the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlunaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

impl AlunaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AlunaConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where the assistant backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000`.
    pub host: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Conversation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// How long a turn may run before the pending "assistant is typing"
    /// placeholder appears. Fast answers settle before this elapses and the
    /// placeholder is skipped entirely.
    pub placeholder_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            placeholder_delay_ms: 300,
        }
    }
}

impl ChatConfig {
    pub fn placeholder_delay(&self) -> Duration {
        Duration::from_millis(self.placeholder_delay_ms)
    }
}

/// Scraping-job tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Fixed interval between job-status queries, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
        }
    }
}

impl JobsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlunaConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.backend.host, "http://localhost:8000");
        assert_eq!(config.backend.request_timeout_secs, 120);
        assert_eq!(config.chat.placeholder_delay_ms, 300);
        assert_eq!(config.jobs.poll_interval_secs, 5);
    }

    #[test]
    fn test_duration_accessors() {
        let config = AlunaConfig::default();
        assert_eq!(config.chat.placeholder_delay(), Duration::from_millis(300));
        assert_eq!(config.jobs.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let toml_str = r#"
[backend]
host = "http://192.168.1.20:9000"

[jobs]
poll_interval_secs = 3
"#;
        let config: AlunaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.host, "http://192.168.1.20:9000");
        assert_eq!(config.backend.request_timeout_secs, 120);
        assert_eq!(config.jobs.poll_interval_secs, 3);
        assert_eq!(config.chat.placeholder_delay_ms, 300);
    }

    #[test]
    fn test_parse_empty_toml_is_all_defaults() {
        let config: AlunaConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend.host, AlunaConfig::default().backend.host);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AlunaConfig::default();
        config.backend.host = "http://example.test:8000".to_string();
        config.chat.placeholder_delay_ms = 450;
        config.save(&path).unwrap();

        let loaded = AlunaConfig::load(&path).unwrap();
        assert_eq!(loaded.backend.host, "http://example.test:8000");
        assert_eq!(loaded.chat.placeholder_delay_ms, 450);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.toml");
        AlunaConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        assert!(AlunaConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        let config = AlunaConfig::load_or_default(&path);
        assert_eq!(config.jobs.poll_interval_secs, 5);
    }

    #[test]
    fn test_load_or_default_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        let config = AlunaConfig::load_or_default(&path);
        assert_eq!(config.backend.host, AlunaConfig::default().backend.host);
    }
}
