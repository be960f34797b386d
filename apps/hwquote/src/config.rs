//! # Application Configuration
//!
//! Where the data file lives, where the web renderer listens, and the
//! header the quote sheet starts with.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --catalog data/other.json   --port 9000                            │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     HWQUOTE_CATALOG_PATH=/srv/catalog.json                             │
//! │     HWQUOTE_PORT=9000                                                  │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, else                                              │
//! │     ~/.config/hwquote/hwquote.toml (Linux)                             │
//! │     ~/Library/Application Support/com.hwquote.hwquote/hwquote.toml     │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [catalog]
//! path = "data/catalog.json"
//! load_mode = "strict"  # strict | lenient
//!
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 8080
//!
//! [quote]
//! quote_no = "Q-2024-001"
//! customer = "ACME"
//! currency = "USD"  # optional, overrides the data file setting
//! ```

use std::path::PathBuf;

use hwquote_catalog::LoadMode;
use hwquote_core::QuoteHeader;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

// =============================================================================
// Catalog Settings
// =============================================================================

/// Where and how the data file is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,

    /// Strict rejects a malformed item record, lenient skips it.
    #[serde(default)]
    pub load_mode: LoadMode,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/catalog.json")
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            path: default_catalog_path(),
            load_mode: LoadMode::default(),
        }
    }
}

// =============================================================================
// Server Settings
// =============================================================================

/// Web renderer listen address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 127.0.0.1, local browser only).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Quote Defaults
// =============================================================================

/// Header a fresh quote sheet starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDefaults {
    #[serde(default = "default_quote_no")]
    pub quote_no: String,

    #[serde(default = "default_customer")]
    pub customer: String,

    /// Overrides `settings.currency` from the data file when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

fn default_quote_no() -> String {
    "Q-2024-001".to_string()
}

fn default_customer() -> String {
    "ACME".to_string()
}

impl Default for QuoteDefaults {
    fn default() -> Self {
        QuoteDefaults {
            quote_no: default_quote_no(),
            customer: default_customer(),
            currency: None,
        }
    }
}

impl QuoteDefaults {
    /// Builds the quote sheet header, falling back to the data file currency.
    pub fn header(&self, data_currency: &str) -> QuoteHeader {
        QuoteHeader {
            quote_no: self.quote_no.clone(),
            customer: self.customer.clone(),
            currency: self
                .currency
                .clone()
                .unwrap_or_else(|| data_currency.to_string()),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub quote: QuoteDefaults,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else hwquote.toml in the config dir)
    /// 3. Environment variables
    ///
    /// Command-line flags are applied by the caller afterwards.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| {
                    AppError::ConfigRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.catalog.path.as_os_str().is_empty() {
            return Err(AppError::InvalidConfig(
                "catalog path must not be empty".into(),
            ));
        }

        if self.server.port == 0 {
            return Err(AppError::InvalidConfig(
                "port must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("HWQUOTE_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = PathBuf::from(path);
        }

        if let Ok(mode) = std::env::var("HWQUOTE_LOAD_MODE") {
            match mode.parse() {
                Ok(parsed) => self.catalog.load_mode = parsed,
                Err(_) => warn!(mode = %mode, "Unknown load mode in environment"),
            }
        }

        if let Ok(addr) = std::env::var("HWQUOTE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("HWQUOTE_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                debug!(port = p, "Overriding port from environment");
                self.server.port = p;
            }
        }

        if let Ok(currency) = std::env::var("HWQUOTE_CURRENCY") {
            self.quote.currency = Some(currency);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hwquote", "hwquote")
            .map(|dirs| dirs.config_dir().join("hwquote.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.path, PathBuf::from("data/catalog.json"));
        assert_eq!(config.catalog.load_mode, LoadMode::Strict);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.quote.quote_no, "Q-2024-001");
        assert!(config.quote.currency.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.server.port = 0;
        assert!(config.validate().is_err());

        config.server.port = 9000;
        config.catalog.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [catalog]
            load_mode = "lenient"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.catalog.load_mode, LoadMode::Lenient);
        assert_eq!(config.catalog.path, PathBuf::from("data/catalog.json"));
        assert_eq!(config.quote.customer, "ACME");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[quote]\nquote_no = \"Q-7\"\ncustomer = \"Globex\"").unwrap();

        let config = AppConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.quote.quote_no, "Q-7");
        assert_eq!(config.quote.customer, "Globex");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = AppConfig::load(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
    }

    #[test]
    fn test_header_currency_fallback() {
        let mut quote = QuoteDefaults::default();
        assert_eq!(quote.header("EUR").currency, "EUR");

        quote.currency = Some("CAD".to_string());
        let header = quote.header("EUR");
        assert_eq!(header.currency, "CAD");
        assert_eq!(header.customer, "ACME");
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[quote]"));
    }
}
