//! Error handling and custom error types
//!
//! Provides unified error handling across the client using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The identity endpoint rejected the API key. Carries the raw response body.
    #[error("Token refresh failed: {0}")]
    Authentication(String),

    /// The generation endpoint answered with a non-200 status.
    #[error("API error (status {status}): {body}")]
    Request { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
