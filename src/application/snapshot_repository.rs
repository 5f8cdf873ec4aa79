// Repository trait for snapshot document access
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {url}: {source}")]
    Deserialize {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch and parse a JSON snapshot document
    async fn fetch_document(&self, url: &str) -> Result<serde_json::Value, FetchError>;

    /// Header-only probe for the document's last modification time.
    /// `Ok(None)` when the store does not report one.
    async fn last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>, FetchError>;
}
