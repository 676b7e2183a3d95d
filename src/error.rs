use thiserror::Error;

/// Main error type for Watchlink
#[derive(Error, Debug)]
pub enum WatchlinkError {
    /// The request was malformed (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The configured API key was rejected (HTTP 401)
    #[error("Invalid API credential: {0}")]
    InvalidCredential(String),

    /// The credential lacks access to the resource (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity or endpoint not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upstream API throttled the request (HTTP 429)
    #[error("Rate limited by upstream API: {0}")]
    RateLimited(String),

    /// The upstream API failed internally (HTTP 500)
    #[error("Upstream API failure: {0}")]
    UpstreamFailure(String),

    /// DNS, connection, or timeout failure before any HTTP response
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Any other HTTP status or unexpected response
    #[error("Unknown API failure: {0}")]
    UnknownFailure(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors (note persistence)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type using WatchlinkError
pub type Result<T> = std::result::Result<T, WatchlinkError>;
