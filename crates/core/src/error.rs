pub use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("api key is not a valid header value")]
    InvalidApiKey,
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl VaultError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
