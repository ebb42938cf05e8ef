use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::builder::ClientBuilder;
use crate::client::error::{FetchFailure, LookupError};
use crate::client::url::lookup_url;
use crate::config::{ClientConfig, ConfigError};
use crate::models::field::kind;
use crate::models::{Document, LookupResult};

/// Whether a lookup was answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupMetadata {
    /// `false` only for the call whose upstream request populated the entry
    pub cache_hit: bool,
}

/// Async proxycheck.io client with a per-instance result cache.
///
/// Clones share the HTTP connection pool and the cache. Concurrent lookups
/// of the same uncached address are coalesced into a single upstream
/// request whose outcome every caller receives.
#[derive(Clone)]
pub struct LookupClient {
    config: Arc<ClientConfig>,
    base_url: Url,
    client: Client,
    cache: Cache<String, Arc<LookupResult>>,
}

impl LookupClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;

        let mut http = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            http = http.timeout(timeout);
        }
        let client = http.build().map_err(ConfigError::HttpClient)?;

        // Entries expire a fixed time after insertion; reads do not extend them
        let cache = Cache::builder()
            .max_capacity(config.max_cache_entries)
            .time_to_live(config.cache_duration)
            .build();

        info!(
            "proxycheck client ready (base: {}, cache: {:?}, max entries: {})",
            config.base_url, config.cache_duration, config.max_cache_entries
        );

        Ok(Self {
            config: Arc::new(config),
            base_url,
            client,
            cache,
        })
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Look up `address`, answering from the cache when possible.
    ///
    /// # Errors
    /// - [`LookupError::InvalidAddress`] for an empty, `.` or `..` address,
    ///   before any I/O
    /// - [`LookupError::Blocked`] when the service answers `denied` or `error`
    /// - [`LookupError::Fetch`] for transport failures and malformed responses
    ///
    /// Failures are not cached; the next call for the address goes upstream
    /// again.
    pub async fn fetch(&self, address: &str) -> Result<Arc<LookupResult>, LookupError> {
        self.fetch_with_metadata(address)
            .await
            .map(|(result, _)| result)
    }

    pub async fn fetch_with_metadata(
        &self,
        address: &str,
    ) -> Result<(Arc<LookupResult>, LookupMetadata), LookupError> {
        let address = validate_address(address)?;

        let entry = self
            .cache
            .entry_by_ref(address)
            .or_try_insert_with(self.load(address))
            .await
            .map_err(|err| LookupError::clone(&err))?;

        let cache_hit = !entry.is_fresh();
        if cache_hit {
            debug!("Cache hit for {}", address);
        }

        Ok((entry.into_value(), LookupMetadata { cache_hit }))
    }

    /// Run [`fetch`](Self::fetch) on a tokio worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_fetch(
        &self,
        address: impl Into<String>,
    ) -> JoinHandle<Result<Arc<LookupResult>, LookupError>> {
        let client = self.clone();
        let address = address.into();
        tokio::spawn(async move { client.fetch(&address).await })
    }

    /// Drop the cached result for `address`, if any.
    pub async fn invalidate(&self, address: &str) {
        self.cache.invalidate(address.trim()).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Number of cached results, including ones pending eviction.
    pub async fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    async fn load(&self, address: &str) -> Result<Arc<LookupResult>, LookupError> {
        debug!("Cache miss for {}, querying upstream", address);

        let fetch_error = |source: FetchFailure| {
            warn!("Lookup for {} failed: {}", address, source);
            LookupError::Fetch {
                address: address.to_string(),
                source,
            }
        };

        let url = lookup_url(
            &self.base_url,
            &self.config.key,
            address,
            &self.config.options,
        );
        let document = self.request_document(&url).await.map_err(fetch_error)?;
        let result = LookupResult::from_document(&document, address)
            .map_err(|e| fetch_error(FetchFailure::Model(e)))?;

        match result {
            LookupResult::Denied(record) | LookupResult::Error(record) => {
                warn!(
                    "Lookup for {} blocked by upstream ({}): {}",
                    address, record.status, record.message
                );
                Err(LookupError::Blocked {
                    status: record.status,
                    message: record.message,
                })
            }
            success => Ok(Arc::new(success)),
        }
    }

    async fn request_document(&self, url: &Url) -> Result<Document, FetchFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchFailure::transport)?;

        // Denials come back as JSON on non-2xx statuses too, so the body is
        // parsed regardless of the HTTP status.
        let status = response.status();
        debug!("Upstream responded with HTTP {}", status);

        let body = response.bytes().await.map_err(FetchFailure::transport)?;
        let value: Value = serde_json::from_slice(&body).map_err(FetchFailure::decode)?;

        match value {
            Value::Object(document) => Ok(document),
            other => Err(FetchFailure::NotAnObject(kind(&other))),
        }
    }
}

fn validate_address(address: &str) -> Result<&str, LookupError> {
    let trimmed = address.trim();
    // Dot segments would be dropped from the request path
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(LookupError::InvalidAddress(address.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        assert_eq!(validate_address(" 1.2.3.4 ").unwrap(), "1.2.3.4");
        assert!(matches!(
            validate_address(""),
            Err(LookupError::InvalidAddress(_))
        ));
        assert!(matches!(
            validate_address("  \t"),
            Err(LookupError::InvalidAddress(_))
        ));
        assert!(matches!(
            validate_address(".."),
            Err(LookupError::InvalidAddress(_))
        ));
        assert_eq!(validate_address("../1.2.3.4").unwrap(), "../1.2.3.4");
    }

    #[tokio::test]
    async fn test_empty_address_fails_without_io() {
        let client = LookupClient::builder()
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        let err = client.fetch("").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidAddress(_)));
        assert_eq!(client.cached_entries().await, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig {
            key: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            LookupClient::new(config),
            Err(ConfigError::Empty("key"))
        ));
    }
}
