//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `CART_API_URL` - Base URL of the stock/product API (default: `http://localhost:3333`)
//! - `CART_API_TOKEN` - Bearer token sent with API requests
//! - `CART_STORAGE_DIR` - Directory holding the durable cart copy (default: `.rocketshoes`)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: `@RocketShoes:cart`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Key the serialized cart is stored under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Environment variable {0} is set but empty")]
    EmptyValue(String),
}

/// Cart application configuration.
#[derive(Clone)]
pub struct CartConfig {
    /// Stock/product API configuration
    pub api: ApiConfig,
    /// Directory for [`crate::storage::FileStorage`]
    pub storage_dir: PathBuf,
    /// Key the cart is stored under
    pub storage_key: String,
}

/// Stock/product API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:3333`
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api", &self.api)
            .field("storage_dir", &self.storage_dir)
            .field("storage_key", &self.storage_key)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an empty or unparsable
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = non_empty(&lookup, "CART_API_URL")?.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e))?;
        let token = non_empty(&lookup, "CART_API_TOKEN")?.map(SecretString::from);
        let storage_dir = non_empty(&lookup, "CART_STORAGE_DIR")?
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);
        let storage_key =
            non_empty(&lookup, "CART_STORAGE_KEY")?.unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            api: ApiConfig { base_url, token },
            storage_dir,
            storage_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read a variable, treating a set-but-blank value as an error.
fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

/// Parse an API base URL, making sure relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("must be an absolute http(s) URL".to_string());
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
