use std::time::Duration;

use crate::client::lookup::LookupClient;
use crate::config::{ClientConfig, ConfigError, LookupOptions};

/// Builder for [`LookupClient`], starting from [`ClientConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = key.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn cache_duration(mut self, duration: Duration) -> Self {
        self.config.cache_duration = duration;
        self
    }

    pub fn max_cache_entries(mut self, entries: u64) -> Self {
        self.config.max_cache_entries = entries;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn options(mut self, options: LookupOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn into_config(self) -> ClientConfig {
        self.config
    }

    pub fn build(self) -> Result<LookupClient, ConfigError> {
        LookupClient::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = ClientBuilder::new()
            .key("abc")
            .cache_duration(Duration::from_secs(30))
            .options(LookupOptions {
                days: 7,
                ..Default::default()
            })
            .into_config();

        assert_eq!(config.key, "abc");
        assert_eq!(config.cache_duration, Duration::from_secs(30));
        assert_eq!(config.options.days, 7);
        assert_eq!(config.options.vpn, 3);
        assert_eq!(config.base_url, crate::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_validates_options() {
        let result = ClientBuilder::new()
            .options(LookupOptions {
                days: 8,
                ..Default::default()
            })
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange { field: "days", .. })
        ));
    }
}
