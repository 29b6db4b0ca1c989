//! Error types shared by the fetch layer and the extractors.
//!
//! Failures fall into three groups:
//!
//! - [`FetchError`]: the network or the server misbehaved. Each error knows
//!   its [`FailureClass`], which decides whether the retry loop tries again.
//! - [`ItemError`]: one article in a batch could not be extracted. These are
//!   caught at the per-article boundary and never leave the article loop.
//! - [`ScrapeError`]: what a consumer-facing operation returns.

use std::time::Duration;

use thiserror::Error;

/// Whether a failed fetch is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP error status or connection failure; retry.
    Transient,
    /// Retrying cannot help (malformed URL, refused redirect, exhausted retries).
    Fatal,
}

/// A single failed fetch, or the end of a retry loop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status outside 2xx.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The retry policy ran out of attempts.
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Classify this error for the retry loop.
    ///
    /// 4xx and 5xx are transient, as are connection and timeout errors.
    /// 3xx only reaches us when redirects are disabled, and repeating the
    /// request will produce the same redirect.
    pub fn class(&self) -> FailureClass {
        match self {
            FetchError::Status { status, .. } if *status >= 400 => FailureClass::Transient,
            FetchError::Status { .. } => FailureClass::Fatal,
            FetchError::Transport { source, .. } if source.is_builder() => FailureClass::Fatal,
            FetchError::Transport { .. } => FailureClass::Transient,
            FetchError::Exhausted { .. } => FailureClass::Fatal,
        }
    }
}

/// Why one article was skipped.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("could not resolve article link {href}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no title found at {url}")]
    MissingTitle { url: String },

    #[error("no body found at {url}")]
    MissingBody { url: String },

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// A locator string that the CSS parser rejected.
#[derive(Debug, Error)]
#[error("invalid selector {locator:?}: {reason}")]
pub struct SelectorError {
    pub locator: String,
    pub reason: String,
}

/// Errors returned to the consumer of the pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A whole-page fetch exhausted its retry policy.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A required weather field matched none of its fallback rules.
    #[error("{source_name}: no rule matched the {field} field")]
    Field {
        source_name: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// The caller's deadline expired before the operation finished.
    #[error("operation did not finish within {0:?}")]
    Deadline(Duration),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
