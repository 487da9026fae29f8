//! # Checkout Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PDV_BACKEND_MODE=http                                              │
//! │     PDV_BASE_URL=https://erp.example.com/api                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/checkout/pdv.toml (Linux)                                │
//! │     ~/Library/Application Support/com.pdv.checkout/pdv.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local backend, 300 ms debounce, "Consumidor Final"                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [terminal]
//! code = "01"
//! default_customer_name = "Consumidor Final"
//! debounce_ms = 300
//!
//! [backend]
//! mode = "http"            # local | http
//! base_url = "http://localhost:8080/api"
//! timeout_secs = 10
//! search_limit = 20
//!
//! [store]
//! database_path = "/var/lib/pdv/pdv.db"   # ":memory:" for a throwaway store
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use pdv_core::DEFAULT_CUSTOMER_NAME;

use crate::error::{ConfigError, ConfigResult};

/// Path value that selects the in-memory store.
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Backend Mode
// =============================================================================

/// Where lookups and submissions go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// The local store (SQLite or memory).
    #[default]
    Local,

    /// A remote HTTP backend at `base_url`.
    Http,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Local => write!(f, "local"),
            BackendMode::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for BackendMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "offline" => Ok(BackendMode::Local),
            "http" | "remote" => Ok(BackendMode::Http),
            other => Err(ConfigError::Invalid(format!(
                "Unknown backend mode: '{}'. Valid options: local, http",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Settings for this checkout terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Terminal code used in receipt numbers.
    #[serde(default = "default_terminal_code")]
    pub code: String,

    /// Customer name sent when the field is left blank.
    #[serde(default = "default_customer_name")]
    pub default_customer_name: String,

    /// Delay between the last keystroke and the catalog lookup.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_terminal_code() -> String {
    "01".to_string()
}

fn default_customer_name() -> String {
    DEFAULT_CUSTOMER_NAME.to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            code: default_terminal_code(),
            default_customer_name: default_customer_name(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Catalog lookup / sale submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub mode: BackendMode,

    /// Base URL of the HTTP backend (required in `http` mode).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum lookup results (local backend).
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_search_limit() -> usize {
    20
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            mode: BackendMode::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            search_limit: default_search_limit(),
        }
    }
}

/// Local store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite file. Defaults to `pdv.db` in the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// PdvConfig
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdvConfig {
    #[serde(default)]
    pub terminal: TerminalSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl PdvConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pdv.toml), if it exists
    /// 3. `PDV_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.terminal.default_customer_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_customer_name must not be blank".into(),
            ));
        }

        if self.backend.mode == BackendMode::Http {
            match self.backend.base_url.as_deref() {
                None => {
                    return Err(ConfigError::Invalid(
                        "base_url is required in http mode".into(),
                    ))
                }
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    return Err(ConfigError::Invalid(format!(
                        "base_url must start with http:// or https://, got: {}",
                        url
                    )))
                }
                Some(_) => {}
            }
        }

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.backend.search_limit == 0 {
            return Err(ConfigError::Invalid(
                "search_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `PDV_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(code) = var("PDV_TERMINAL_CODE") {
            self.terminal.code = code;
        }

        if let Some(name) = var("PDV_CUSTOMER_NAME") {
            self.terminal.default_customer_name = name;
        }

        if let Some(ms) = var("PDV_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.terminal.debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring invalid PDV_DEBOUNCE_MS"),
            }
        }

        if let Some(mode) = var("PDV_BACKEND_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding backend mode from environment");
                    self.backend.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown backend mode in environment"),
            }
        }

        if let Some(url) = var("PDV_BASE_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.backend.base_url = Some(url);
        }

        if let Some(secs) = var("PDV_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.backend.timeout_secs = secs;
            }
        }

        if let Some(limit) = var("PDV_SEARCH_LIMIT") {
            if let Ok(limit) = limit.parse::<usize>() {
                self.backend.search_limit = limit;
            }
        }

        if let Some(path) = var("PDV_DATABASE_PATH") {
            self.store.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pdv", "checkout")
            .map(|dirs| dirs.config_dir().join("pdv.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.terminal.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// The SQLite file to open, `None` for the in-memory store.
    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.store.database_path {
            Some(path) if path.as_os_str() == IN_MEMORY_PATH => None,
            Some(path) => Some(path.clone()),
            None => Some(
                directories::ProjectDirs::from("com", "pdv", "checkout")
                    .map(|dirs| dirs.data_dir().join("pdv.db"))
                    .unwrap_or_else(|| PathBuf::from("pdv.db")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_backend_mode_parsing() {
        assert_eq!("local".parse::<BackendMode>().unwrap(), BackendMode::Local);
        assert_eq!("HTTP".parse::<BackendMode>().unwrap(), BackendMode::Http);
        assert_eq!("remote".parse::<BackendMode>().unwrap(), BackendMode::Http);
        assert!("grpc".parse::<BackendMode>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = PdvConfig::default();
        assert_eq!(config.terminal.default_customer_name, "Consumidor Final");
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.backend.mode, BackendMode::Local);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PdvConfig::default();

        config.backend.mode = BackendMode::Http;
        assert!(config.validate().is_err());

        config.backend.base_url = Some("ftp://erp".to_string());
        assert!(config.validate().is_err());

        config.backend.base_url = Some("http://localhost:8080/api".to_string());
        assert!(config.validate().is_ok());

        config.backend.search_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PDV_BACKEND_MODE", "http"),
            ("PDV_BASE_URL", "https://erp.example.com/api"),
            ("PDV_DEBOUNCE_MS", "150"),
            ("PDV_CUSTOMER_NAME", "Cliente Balcao"),
            ("PDV_DATABASE_PATH", ":memory:"),
        ]
        .into_iter()
        .collect();

        let mut config = PdvConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.mode, BackendMode::Http);
        assert_eq!(config.backend.base_url.as_deref(), Some("https://erp.example.com/api"));
        assert_eq!(config.terminal.debounce_ms, 150);
        assert_eq!(config.terminal.default_customer_name, "Cliente Balcao");
        assert_eq!(config.database_path(), None);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = PdvConfig::default();
        config.apply_overrides(|key| match key {
            "PDV_DEBOUNCE_MS" => Some("soon".to_string()),
            "PDV_BACKEND_MODE" => Some("carrier-pigeon".to_string()),
            _ => None,
        });

        assert_eq!(config.terminal.debounce_ms, 300);
        assert_eq!(config.backend.mode, BackendMode::Local);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdv.toml");
        std::fs::write(
            &path,
            "[backend]\nmode = \"http\"\nbase_url = \"http://127.0.0.1:9000\"\n",
        )
        .unwrap();

        let config: PdvConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Http);
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.terminal.debounce_ms, 300);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pdv.toml");

        let mut config = PdvConfig::default();
        config.terminal.code = "07".to_string();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[terminal]"));
        let reloaded: PdvConfig = toml::from_str(&contents).unwrap();
        assert_eq!(reloaded.terminal.code, "07");
    }
}
