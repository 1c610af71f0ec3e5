//! Error types for the API client.

/// Errors that can occur when building queries or making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty (dataset identifier at
    /// construction, column or value at `filter`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A required response header was absent or could not be parsed.
    #[error("missing or malformed {header} header")]
    MalformedHeader { header: &'static str },
    /// The API returned a non-success status with a body snippet.
    #[error("request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The underlying HTTP request failed (network error, timeout).
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    /// A response body could not be decoded as JSON.
    #[error("failed to parse response body")]
    Parse(#[source] serde_json::Error),
}
