use thiserror::Error;

/// Failures reported by the workspace API client.
///
/// These never abort a digest run on their own: the corpus builder skips a
/// failing channel and the contributor lookup falls back to the raw user id.
/// Only the orchestrator decides which of them become a [`DigestError`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack API call {method} failed: {code}")]
    Api { method: &'static str, code: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode {method} response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rate limited on {method}, giving up after retries")]
    RateLimited { method: &'static str },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Errors that abort a digest run.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Configuration required: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Target channel #{channel} could not be resolved: {source}")]
    ChannelResolution {
        channel: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to post digest to #{channel}: {source}")]
    Delivery {
        channel: String,
        #[source]
        source: ApiError,
    },
}

pub type Result<T> = core::result::Result<T, DigestError>;
