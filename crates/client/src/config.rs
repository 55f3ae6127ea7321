//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VIVARIUM_API_BASE` - Base URL of the marketplace API (e.g., <https://api.vivarium.market>)
//!
//! ## Optional
//! - `VIVARIUM_STATE_DIR` - Directory for durable client state (identity, cart)
//! - `VIVARIUM_PAYMENT_PUBLISHABLE_KEY` - Publishable key for the payment processor
//! - `XDG_DATA_HOME` - Standard data directory, used when `VIVARIUM_STATE_DIR` is unset

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the marketplace API
    pub api_base: Url,
    /// Directory for durable client state (identity, cart lines)
    pub state_dir: PathBuf,
    /// Publishable key for the payment processor, when payments are enabled
    pub payment_publishable_key: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base =
            parse_api_base("VIVARIUM_API_BASE", &get_required_env("VIVARIUM_API_BASE")?)?;
        let state_dir = resolve_state_dir(
            get_optional_env("VIVARIUM_STATE_DIR"),
            get_optional_env("XDG_DATA_HOME"),
            get_optional_env("HOME"),
        );
        let payment_publishable_key = get_optional_env("VIVARIUM_PAYMENT_PUBLISHABLE_KEY");

        Ok(Self {
            api_base,
            state_dir,
            payment_publishable_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse and validate an API base URL.
fn parse_api_base(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Resolve the durable state directory.
///
/// Uses `VIVARIUM_STATE_DIR` if set, otherwise `$XDG_DATA_HOME/vivarium` or
/// `~/.local/share/vivarium`.
fn resolve_state_dir(
    override_dir: Option<String>,
    xdg_data_home: Option<String>,
    home: Option<String>,
) -> PathBuf {
    if let Some(dir) = override_dir
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    xdg_data_home
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            home.filter(|s| !s.is_empty())
                .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
                .join(".local")
                .join("share")
        })
        .join("vivarium")
}
