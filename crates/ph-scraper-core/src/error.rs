//! Error types for the profile scraper
//!
//! Configuration errors are raised before any network activity, transient
//! network errors are retried by the client and surface as
//! [`ScraperError::RetriesExhausted`] once the attempt budget is spent.

use thiserror::Error;

/// Error type for all scraper operations
#[derive(Error, Debug)]
pub enum ScraperError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status that is neither success nor 404
    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Every attempt for a request failed with a transient error
    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<ScraperError>,
    },

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL points at a host outside the configured site
    #[error("Invalid domain: '{host}' (expected {expected})")]
    InvalidDomain { host: String, expected: String },

    /// First path segment is not a known profile content type
    #[error("Unsupported content type: '{0}'")]
    UnsupportedContentType(String),

    /// Profile URL has no profile name
    #[error("Profile name is empty")]
    EmptyProfileName,

    /// Profile page itself returned 404
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Failed to parse HTML content
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// Cache file could not be read or written
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file is not valid JSON
    #[error("Invalid cache JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScraperError {
    /// Whether a fresh attempt of the same request may succeed
    ///
    /// Timeouts, connection failures and unexpected statuses are transient.
    /// Everything else (including 404, which the client never turns into an
    /// error during pagination) is final.
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::Http(e) => !e.is_builder(),
            ScraperError::UnexpectedStatus { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;
