use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("Invalid callback URL: {0}")]
    InvalidUrl(String),

    #[error("Secret key is not a valid header value")]
    InvalidSecret,

    #[error("Callback request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Callback rejected with HTTP {0}")]
    Status(StatusCode),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
