//! Blocking wrapper around the async [`LookupClient`](super::LookupClient)
//!
//! The wrapper owns a small tokio runtime and drives lookups on it. It must
//! not be created, used or dropped from within an async context.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::client::error::LookupError;
use crate::client::lookup::{LookupClient as AsyncLookupClient, LookupMetadata};
use crate::config::{ClientConfig, ConfigError};
use crate::models::LookupResult;

pub struct LookupClient {
    inner: AsyncLookupClient,
    runtime: Runtime,
}

impl LookupClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("proxycheck-blocking")
            .enable_all()
            .build()
            .map_err(ConfigError::Runtime)?;

        let inner = {
            let _guard = runtime.enter();
            AsyncLookupClient::new(config)?
        };

        Ok(Self { inner, runtime })
    }

    /// Blocking [`fetch`](AsyncLookupClient::fetch).
    pub fn fetch(&self, address: &str) -> Result<Arc<LookupResult>, LookupError> {
        self.runtime.block_on(self.inner.fetch(address))
    }

    pub fn fetch_with_metadata(
        &self,
        address: &str,
    ) -> Result<(Arc<LookupResult>, LookupMetadata), LookupError> {
        self.runtime.block_on(self.inner.fetch_with_metadata(address))
    }

    pub fn invalidate(&self, address: &str) {
        self.runtime.block_on(self.inner.invalidate(address))
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Number of cached results, including ones pending eviction.
    pub fn cached_entries(&self) -> u64 {
        self.runtime.block_on(self.inner.cached_entries())
    }

    /// The async client sharing this wrapper's cache.
    pub fn as_async(&self) -> &AsyncLookupClient {
        &self.inner
    }
}

