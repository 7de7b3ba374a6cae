//! Error types for homework-bot
//!
//! Centralized error handling using thiserror. Every stage of a poll cycle has
//! its own error enum; `CycleError` is the closed union the poller dispatches on.

use thiserror::Error;

/// Startup failures. These are the only errors that stop the bot.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or blank
    #[error("Missing environment variable: {0}")]
    MissingCredential(&'static str),

    /// Settings that would make the loop meaningless
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Failure to obtain a response from the homework status endpoint
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure
    #[error("Endpoint unreachable: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status. The body is kept for logs only.
    #[error("Endpoint returned status {status}")]
    Status { status: u16, body: String },

    /// Body was not valid JSON
    #[error("Malformed response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Error text must not vary with from_date
        let err = err.without_url();
        if err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Longest server-supplied text kept in an error
pub const MAX_ERROR_TEXT_CHARS: usize = 200;

/// Cut server-supplied text to `MAX_ERROR_TEXT_CHARS` characters
pub fn truncate_text(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_TEXT_CHARS).collect();
    if chars.next().is_some() { format!("{}...", head) } else { head }
}

/// The response did not have the expected shape
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Top-level value is not a JSON object
    #[error("Response is not an object, got {0}")]
    Shape(&'static str),

    /// A required key is absent
    #[error("Response has no key '{0}'")]
    MissingKey(&'static str),

    /// A key is present but holds the wrong type
    #[error("Key '{key}' must be {expected}, got {found}")]
    Type {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// An element of the homework list is not an object
    #[error("Homework at index {index} is not an object, got {found}")]
    Item { index: usize, found: &'static str },
}

/// A homework record could not be turned into a message
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Homework is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),
}

/// Telegram did not accept the message
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Telegram unreachable: {0}")]
    Transport(String),

    #[error("Telegram rejected message ({status}): {description}")]
    Rejected { status: u16, description: String },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        // Error text must not contain the bot token
        DeliveryError::Transport(err.without_url().to_string())
    }
}

/// Anything that can go wrong inside a single poll cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl CycleError {
    /// Short category name used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Validation(_) => "validation",
            CycleError::Extraction(_) => "extraction",
            CycleError::Delivery(_) => "delivery",
        }
    }
}
