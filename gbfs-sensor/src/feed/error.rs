//! Feed error types.

/// Errors that can occur while fetching or parsing a GBFS document.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not a valid GBFS document
    #[error("JSON parse error for {url}: {message}")]
    Json { url: String, message: String },
}
