use thiserror::Error;

/// Why a single review page produced no record. Never fatal to a batch.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}
