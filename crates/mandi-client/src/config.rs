//! # Client Configuration
//!
//! Where the backend lives, how the session is kept and how delivery is
//! priced.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MANDI_API_BASE_URL=https://api.farmersmandi.in                     │
//! │     MANDI_REMEMBER_ME=false                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/client.toml (Linux)                           │
//! │     ~/Library/Application Support/in.farmersmandi.storefront/          │
//! │       client.toml (macOS)                                              │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000, 30 minute tokens, ₹50 delivery              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [session]
//! remember_me = true
//! token_ttl_minutes = 30
//!
//! [checkout]
//! delivery_fee = 50
//! free_delivery_threshold = 500
//! ```

use mandi_core::{DeliveryPolicy, Money};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

const CONFIG_FILE: &str = "client.toml";
const SESSION_FILE: &str = "session.json";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("in", "farmersmandi", "storefront")
}

// =============================================================================
// API Settings
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the REST API, e.g. `http://localhost:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// How the signed-in session is kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session file override. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// When false, the session never outlives `token_ttl_minutes`, even if
    /// the token itself says it is valid for longer.
    #[serde(default = "default_true")]
    pub remember_me: bool,

    /// Lifetime assumed for tokens whose expiry cannot be read.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
}

fn default_true() -> bool {
    true
}

/// One year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

fn default_token_ttl() -> i64 {
    30
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            path: None,
            remember_me: true,
            token_ttl_minutes: default_token_ttl(),
        }
    }
}

// =============================================================================
// Checkout Settings
// =============================================================================

/// Delivery pricing, in whole rupees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: i64,

    /// Subtotals strictly above this ship free.
    #[serde(default = "default_free_threshold")]
    pub free_delivery_threshold: i64,
}

fn default_delivery_fee() -> i64 {
    mandi_core::DEFAULT_DELIVERY_FEE_RUPEES
}

fn default_free_threshold() -> i64 {
    mandi_core::DEFAULT_FREE_DELIVERY_THRESHOLD_RUPEES
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            delivery_fee: default_delivery_fee(),
            free_delivery_threshold: default_free_threshold(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, returning where it was written.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Config(format!("{}: {}", parent.display(), e)))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;

        info!(?path, "Client config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::Config(format!(
                "API base URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.session.token_ttl_minutes <= 0
            || self.session.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES
        {
            return Err(ClientError::Config(format!(
                "token_ttl_minutes must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }

        if self.checkout.delivery_fee < 0 || self.checkout.free_delivery_threshold < 0 {
            return Err(ClientError::Config(
                "delivery pricing cannot be negative".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MANDI_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("MANDI_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring invalid MANDI_API_TIMEOUT_SECS"),
            }
        }

        if let Ok(path) = std::env::var("MANDI_SESSION_PATH") {
            debug!(path = %path, "Overriding session path from environment");
            self.session.path = Some(PathBuf::from(path));
        }

        if let Ok(remember) = std::env::var("MANDI_REMEMBER_ME") {
            match remember.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.session.remember_me = true,
                "0" | "false" | "no" => self.session.remember_me = false,
                _ => warn!(value = %remember, "Ignoring invalid MANDI_REMEMBER_ME"),
            }
        }

        if let Ok(fee) = std::env::var("MANDI_DELIVERY_FEE") {
            match fee.parse::<i64>() {
                Ok(f) => self.checkout.delivery_fee = f,
                Err(_) => warn!(value = %fee, "Ignoring invalid MANDI_DELIVERY_FEE"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed API root.
    pub fn base_url(&self) -> ClientResult<Url> {
        Ok(Url::parse(&self.api.base_url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Where the session file lives.
    pub fn session_path(&self) -> ClientResult<PathBuf> {
        if let Some(path) = &self.session.path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(SESSION_FILE))
            .ok_or_else(|| ClientError::Config("No data directory available".into()))
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy::new(
            Money::from_rupees(self.checkout.delivery_fee),
            Money::from_rupees(self.checkout.free_delivery_threshold),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.token_ttl_minutes, 30);
        assert!(config.session.remember_me);
        assert_eq!(config.delivery_policy(), DeliveryPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://api.farmersmandi.in".to_string();
        assert!(config.validate().is_ok());

        config.session.token_ttl_minutes = 0;
        assert!(config.validate().is_err());

        config.session.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
        assert!(config.validate().is_ok());

        config.session.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES + 1;
        assert!(config.validate().is_err());

        config.session.token_ttl_minutes = i64::MAX;
        assert!(config.validate().is_err());

        config.session.token_ttl_minutes = 30;
        config.checkout.delivery_fee = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [checkout]
            delivery_fee = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.checkout.delivery_fee, 40);
        assert_eq!(config.checkout.free_delivery_threshold, 500);
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let mut config = ClientConfig::default();
        config.api.base_url = "https://api.farmersmandi.in".to_string();
        config.session.remember_me = false;
        config.save(Some(path.clone())).unwrap();

        let loaded: ClientConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.farmersmandi.in");
        assert!(!loaded.session.remember_me);
    }

    #[test]
    fn test_session_path_override() {
        let mut config = ClientConfig::default();
        config.session.path = Some(PathBuf::from("/tmp/mandi/session.json"));
        assert_eq!(
            config.session_path().unwrap(),
            PathBuf::from("/tmp/mandi/session.json")
        );
    }
}
