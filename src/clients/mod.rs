pub mod anilist;
pub mod cache;
pub mod kitsu;

use crate::domain::MediaQuery;
use serde_json::Value;
use thiserror::Error;

pub use cache::ResponseCache;

pub const ANILIST: &str = "AniList";
pub const KITSU: &str = "Kitsu";

/// Failures of a single upstream provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{service} API error: {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} request failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned an unexpected payload: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} query error: {message}")]
    GraphQl {
        service: &'static str,
        message: String,
    },

    #[error("{service} has no anime with id {id}")]
    NotFound { service: &'static str, id: i64 },
}

impl ProviderError {
    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::Status { service, .. }
            | Self::Network { service, .. }
            | Self::Decode { service, .. }
            | Self::GraphQl { service, .. }
            | Self::NotFound { service, .. } => service,
        }
    }

    /// Whether the provider itself is at fault. Everything except a
    /// missing record counts and makes the caller eligible for fallback.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }

    /// Transient failures worth a second attempt: network errors, rate
    /// limiting and server-side statuses.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn decode(service: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            service,
            message: message.into(),
        }
    }
}

/// One upstream metadata source behind the aggregation route.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name for logging, metrics and error payloads.
    fn name(&self) -> &'static str;

    /// Runs `query` upstream and returns the provider-shaped payload:
    /// an array for list kinds, a single object for detail.
    async fn fetch(&self, query: &MediaQuery) -> Result<Value, ProviderError>;

    /// Like [`Self::fetch`] but without retrying transient failures.
    async fn fetch_once(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        self.fetch(query).await
    }
}

/// Shared HTTP client for every upstream adapter, so connections are pooled.
pub fn build_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("animedex/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}
