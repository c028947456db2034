//! Error types and result handling for hondana operations.
//!
//! All fallible operations return a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`.
//!
//! Scraping itself is lenient: a missing DOM node degrades to an empty string
//! or zero rather than an error. Errors are reserved for things a parser cannot
//! paper over:
//!
//! - **Network Errors**: connection failures and HTTP transport errors
//! - **Parse Errors**: embedded payloads that are not what the page promised
//! - **Source Errors**: non-success HTTP statuses, with the source id attached
//! - **JSON / Base64 / Decrypt Errors**: malformed script payloads
//!
//! # Examples
//!
//! ```rust
//! use hondana::{Error, Result};
//!
//! fn classify(result: Result<()>) -> &'static str {
//!     match result {
//!         Ok(()) => "ok",
//!         Err(Error::Network(_)) => "network",
//!         Err(Error::Json(_)) => "bad payload",
//!         Err(_) => "other",
//!     }
//! }
//!
//! assert_eq!(classify(Err(Error::parse("boom"))), "other");
//! ```

use thiserror::Error;

/// Type alias for Results with hondana errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all hondana operations.
///
/// # Variants
///
/// * [`Network`](Error::Network) - HTTP client and connection errors
/// * [`Parse`](Error::Parse) - Data parsing and format errors
/// * [`Source`](Error::Source) - Source-specific errors with context
/// * [`NotFound`](Error::NotFound) - Missing resources
/// * [`RateLimit`](Error::RateLimit) - Rate limiting responses
/// * [`Json`](Error::Json) - JSON deserialization errors
/// * [`Base64`](Error::Base64) - Invalid base64 in an embedded payload
/// * [`Decrypt`](Error::Decrypt) - Cipher failures while decoding page lists
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from HTTP operations.
    ///
    /// Wraps errors from reqwest: connection failures, DNS resolution,
    /// TLS and body read errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML/JSON parsing and data format errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::parse("chapter script has no image list");
    /// assert!(error.to_string().contains("image list"));
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source-specific errors with contextual information.
    ///
    /// * `src` - The identifier of the source that encountered the error
    /// * `message` - Descriptive error message explaining what went wrong
    #[error("Source error [{src}]: {message}")]
    Source { src: String, message: String },

    /// Resource not found errors.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The site answered 429 after all configured attempts.
    ///
    /// `retry_after` carries the `Retry-After` header value in seconds when
    /// the site sent one.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    /// JSON deserialization errors.
    ///
    /// Embedded script payloads and autosuggest responses are parsed without a
    /// guard, so malformed input surfaces here.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base64 in an encrypted page-list payload.
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Cipher setup or padding failure while decrypting a page-list payload.
    #[error("Decrypt error: {0}")]
    Decrypt(String),
}

impl Error {
    /// Creates a parse error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::parse(format!("Expected {} pages, found {}", 10, 5));
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a source-specific error with source ID and message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::source("bainian", "HTTP 503 Service Unavailable");
    /// assert_eq!(error.to_string(), "Source error [bainian]: HTTP 503 Service Unavailable");
    /// ```
    pub fn source(src: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            src: src.into(),
            message: msg.into(),
        }
    }

    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a rate limit error with optional retry-after time.
    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        Error::RateLimit { retry_after }
    }

    /// Creates a decrypt error with the given message.
    pub fn decrypt(msg: impl Into<String>) -> Self {
        Error::Decrypt(msg.into())
    }
}
