use std::sync::Arc;

use thiserror::Error;

use crate::models::ModelError;

/// Failure of a single lookup.
///
/// Cloneable so one failed upstream call can be handed to every caller that
/// was waiting on the same address.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("failed to fetch data for address {address}")]
    Fetch {
        address: String,
        #[source]
        source: FetchFailure,
    },
    /// The service answered with `denied` or `error`
    #[error("{upper}: {message}", upper = .status.to_uppercase())]
    Blocked { status: String, message: String },
}

#[derive(Debug, Clone, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),
    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
    #[error("response body is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
    #[error("malformed response: {0}")]
    Model(#[from] ModelError),
}

impl LookupError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

impl FetchFailure {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        // The request URL carries the API key
        Self::Transport(Arc::new(err.without_url()))
    }

    pub(crate) fn decode(err: serde_json::Error) -> Self {
        Self::Decode(Arc::new(err))
    }
}
