//! Catalog error types.

use thiserror::Error;

/// Errors from catalog requests.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure (connect, timeout, body read).
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("catalog returned {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("unexpected catalog response: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog answered 200 with an error object instead of data.
    #[error("catalog error {code}: {message}")]
    Api {
        /// Catalog error code (`4` is the quota limit).
        code: i64,
        /// Catalog error message.
        message: String,
    },

    /// The release window reaches past the representable date range.
    #[error("release window of {0} days is out of range")]
    InvalidWindow(u32),

    /// A release date could not be parsed.
    #[error("invalid release date {0:?}")]
    InvalidDate(String),
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
