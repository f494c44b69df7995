use thiserror::Error;

/// Transport-level failure talking to an HTTP server.
///
/// Rate fetching and Telegram delivery each wrap this in their own error
/// type and decide there whether it is worth retrying.
#[derive(Debug, Error)]
pub enum HttpError {
    /// DNS, TCP, TLS or a dropped body stream.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Building the reqwest client failed, typically a TLS backend problem.
    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}
