pub mod client;
pub mod config;
pub mod models;

pub use client::{ClientBuilder, FetchFailure, LookupClient, LookupError, LookupMetadata};
pub use config::{ClientConfig, ConfigError, LookupOptions};
pub use models::{AddressRecord, LookupResult, FIELD_IS_NOT_SET};
