//! Environment-driven configuration for the catalogue cache.

use std::time::Duration;

use mockable::{DefaultEnv, Env};
use thiserror::Error;
use url::Url;

/// Environment variable holding the catalogue backend base URL.
pub const BASE_URL_ENV: &str = "API_CATALOG_BASE_URL";
/// Environment variable holding the cache TTL in seconds.
pub const CACHE_TTL_SECONDS_ENV: &str = "API_CATALOG_CACHE_TTL_SECONDS";
/// Environment variable holding the HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECONDS_ENV: &str = "API_CATALOG_REQUEST_TIMEOUT_SECONDS";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Settings for the fetch coordinator and its HTTP source.
///
/// # Example
///
/// ```
/// # use api_catalog::domain::CatalogConfig;
/// # use std::time::Duration;
/// let config = CatalogConfig::default();
/// assert_eq!(config.cache_ttl(), Duration::from_secs(300));
///
/// let custom = CatalogConfig::default().with_cache_ttl(Duration::from_secs(60));
/// assert_eq!(custom.cache_ttl(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    base_url: Url,
    cache_ttl: Duration,
    request_timeout: Duration,
}

impl CatalogConfig {
    /// Default cache TTL in seconds (five minutes).
    const DEFAULT_TTL_SECONDS: u64 = 300;
    /// Minimum cache TTL in seconds.
    const MIN_TTL_SECONDS: u64 = 1;
    /// Maximum cache TTL in seconds (one day).
    const MAX_TTL_SECONDS: u64 = 86_400;
    /// Default request timeout in seconds.
    const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
    /// Minimum request timeout in seconds.
    const MIN_TIMEOUT_SECONDS: u64 = 1;
    /// Maximum request timeout in seconds.
    const MAX_TIMEOUT_SECONDS: u64 = 600;

    /// Load configuration from the real process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogConfigError::InvalidEnv`] when a variable is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, CatalogConfigError> {
        Self::from_env_with(&DefaultEnv::new())
    }

    /// Load configuration from a custom environment source.
    ///
    /// Numeric settings are clamped to their allowed ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogConfigError::InvalidEnv`] when a variable is set but
    /// cannot be parsed.
    pub fn from_env_with(env: &impl Env) -> Result<Self, CatalogConfigError> {
        let base_url = env
            .string(BASE_URL_ENV)
            .map_or_else(default_base_url, |raw| parse_base_url(&raw))?;
        let ttl_seconds = seconds_from_env(env, CACHE_TTL_SECONDS_ENV)?
            .unwrap_or(Self::DEFAULT_TTL_SECONDS)
            .clamp(Self::MIN_TTL_SECONDS, Self::MAX_TTL_SECONDS);
        let timeout_seconds = seconds_from_env(env, REQUEST_TIMEOUT_SECONDS_ENV)?
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECONDS)
            .clamp(Self::MIN_TIMEOUT_SECONDS, Self::MAX_TIMEOUT_SECONDS);

        Ok(Self {
            base_url,
            cache_ttl: Duration::from_secs(ttl_seconds),
            request_timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// Override the backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Override the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Override the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Base URL of the catalogue backend.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Age after which a cached entry is refetched.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Transport timeout applied to each backend request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL)
                .unwrap_or_else(|error| panic!("default base URL must parse: {error}")),
            cache_ttl: Duration::from_secs(Self::DEFAULT_TTL_SECONDS),
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

fn default_base_url() -> Result<Url, CatalogConfigError> {
    parse_base_url(DEFAULT_BASE_URL)
}

fn parse_base_url(raw: &str) -> Result<Url, CatalogConfigError> {
    let invalid = |reason: String| CatalogConfigError::InvalidEnv {
        name: BASE_URL_ENV,
        value: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https".to_owned()));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_owned()));
    }
    Ok(url)
}

fn seconds_from_env(env: &impl Env, name: &'static str) -> Result<Option<u64>, CatalogConfigError> {
    let Some(raw) = env.string(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|error| CatalogConfigError::InvalidEnv {
            name,
            value: raw.clone(),
            reason: error.to_string(),
        })
}
