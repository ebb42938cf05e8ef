use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://proxycheck.io";
pub const DEFAULT_KEY: &str = "license_key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key; without a plan the service allows a small daily quota
    pub key: String,
    pub base_url: String,
    /// Time an entry stays cached after it was written
    pub cache_duration: Duration,
    pub max_cache_entries: u64,
    /// Transport timeout per request, `None` to rely on the OS
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub options: LookupOptions,
}

/// Query flags sent with every lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOptions {
    /// VPN detection tier, 0-3
    pub vpn: u8,
    pub asn: bool,
    pub node: bool,
    pub time: bool,
    pub port: bool,
    pub seen: bool,
    /// Compact response format
    pub short: bool,
    /// Risk score verbosity, 0-2
    pub risk: u8,
    /// History window in days, 1-7
    pub days: u8,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u8,
        max: u8,
        value: u8,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("cache duration must be greater than zero")]
    ZeroCacheDuration,
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            vpn: 3,
            asn: true,
            node: true,
            time: true,
            port: true,
            seen: true,
            short: false,
            risk: 2,
            days: 3,
        }
    }
}

impl LookupOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("vpn", self.vpn, 0, 3)?;
        check_range("risk", self.risk, 0, 2)?;
        check_range("days", self.days, 1, 7)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_duration: Self::default_cache_duration(),
            max_cache_entries: 10_000,
            timeout: Some(Duration::from_secs(10)),
            user_agent: format!("proxycheck-rs/{}", env!("CARGO_PKG_VERSION")),
            options: LookupOptions::default(),
        }
    }
}

impl ClientConfig {
    const fn default_cache_duration() -> Duration {
        Duration::from_secs(60 * 60)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.trim().is_empty() {
            return Err(ConfigError::Empty("key"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Empty("base_url"));
        }
        if self.cache_duration.is_zero() {
            return Err(ConfigError::ZeroCacheDuration);
        }
        self.parsed_base_url()?;
        self.options.validate()
    }

    /// `base_url` as a URL that lookup paths can be appended to.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let url = Url::parse(self.base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(url)
    }

    /// Build a configuration from `PROXYCHECK_*` environment variables,
    /// reading a `.env` file first if one exists. Unset variables keep their
    /// defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let option_defaults = LookupOptions::default();

        let key = std::env::var("PROXYCHECK_KEY").unwrap_or(defaults.key);
        let base_url = std::env::var("PROXYCHECK_BASE_URL").unwrap_or(defaults.base_url);

        let cache_duration = match std::env::var("PROXYCHECK_CACHE_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse::<u64>()
                    .context("PROXYCHECK_CACHE_SECS must be a number of seconds")?,
            ),
            Err(_) => defaults.cache_duration,
        };

        let timeout = match std::env::var("PROXYCHECK_TIMEOUT_SECS") {
            Ok(v) => {
                let secs = v
                    .parse::<u64>()
                    .context("PROXYCHECK_TIMEOUT_SECS must be a number of seconds")?;
                // 0 disables the transport timeout
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => defaults.timeout,
        };

        let max_cache_entries =
            env_value("PROXYCHECK_CACHE_MAX_ENTRIES", defaults.max_cache_entries)?;

        let options = LookupOptions {
            vpn: env_value("PROXYCHECK_VPN", option_defaults.vpn)?,
            asn: env_flag("PROXYCHECK_ASN", option_defaults.asn),
            node: env_flag("PROXYCHECK_NODE", option_defaults.node),
            time: env_flag("PROXYCHECK_TIME", option_defaults.time),
            port: env_flag("PROXYCHECK_PORT", option_defaults.port),
            seen: env_flag("PROXYCHECK_SEEN", option_defaults.seen),
            short: env_flag("PROXYCHECK_SHORT", option_defaults.short),
            risk: env_value("PROXYCHECK_RISK", option_defaults.risk)?,
            days: env_value("PROXYCHECK_DAYS", option_defaults.days)?,
        };

        let config = ClientConfig {
            key,
            base_url,
            cache_duration,
            max_cache_entries,
            timeout,
            user_agent: defaults.user_agent,
            options,
        };
        config.validate()?;

        Ok(config)
    }
}

fn env_flag(var: &str, default: bool) -> bool {
    std::env::var(var)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_value<T>(var: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(var, std::env::var(var).ok(), default)
}

fn parse_value<T>(var: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("{var} has an invalid value '{v}'")),
        None => Ok(default),
    }
}
