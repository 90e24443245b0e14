//! Error types for the DNClear API client.
//!
//! # Design
//! Failures are split by where they happened: the transport never produced a
//! response (`Transport`), the server answered with a non-2xx status
//! (`NotFound`, `Forbidden`, `HttpError`), or the body could not be decoded
//! (`DeserializationError`). `UnsupportedMethod` and `ConfigError` are raised
//! before any request leaves the process.

use thiserror::Error;

/// Errors returned by `DncClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was received: connection refused, DNS failure,
    /// timeout, or a broken body stream.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server returned 404, e.g. removing a number that is not listed.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the `x-api-key` header.
    #[error("forbidden: API key rejected")]
    Forbidden,

    /// The server returned a non-2xx status other than 403 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The dispatcher only speaks GET, POST and DELETE.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// HTTP status code for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Forbidden => Some(403),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
