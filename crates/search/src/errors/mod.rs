//! Error types and failure classification for the search engine.
//!
//! This module provides:
//! - [`SearchError`]: The error enum returned by adapters and the credential rotator
//! - [`FailureClass`]: Classification used by the rotator to decide whether to fail over

mod failure;

pub use failure::FailureClass;

use thiserror::Error;

/// Errors that can occur while fetching products from a source.
///
/// None of these ever escape [`Aggregator::search`](crate::Aggregator::search):
/// the aggregator turns them into an empty contribution and records the cause
/// in the [`SearchReport`](crate::SearchReport).
#[derive(Error, Debug)]
pub enum SearchError {
    /// The source could not be reached (connection refused, DNS, TLS, ...).
    #[error("Source unavailable: {adapter} - {message}")]
    SourceUnavailable {
        /// The adapter or API client that failed
        adapter: String,
        /// The transport error message
        message: String,
    },

    /// The source answered with a non-success HTTP status.
    #[error("HTTP {status} from {adapter}")]
    Http {
        /// The adapter or API client that failed
        adapter: String,
        /// The HTTP status code
        status: u16,
    },

    /// The source rate limited the request (HTTP 429 on a storefront).
    #[error("Rate limited: {adapter}")]
    RateLimited {
        /// The adapter that was rate limited
        adapter: String,
    },

    /// The request to the source timed out.
    #[error("Timeout: {adapter}")]
    Timeout {
        /// The adapter that timed out
        adapter: String,
    },

    /// The response body could not be understood.
    #[error("Parse error: {adapter} - {message}")]
    Parse {
        /// The adapter that returned the unparseable body
        adapter: String,
        /// Description of the parse failure
        message: String,
    },

    /// The hosted search API reported that this credential is out of quota.
    #[error("Quota exhausted for credential: {credential}")]
    QuotaExhausted {
        /// Label of the exhausted credential
        credential: String,
    },

    /// Every credential in the pool was tried within one request and none succeeded.
    #[error("All credentials exhausted after {attempts} attempts")]
    AllCredentialsExhausted {
        /// Number of attempts made
        attempts: usize,
    },

    /// The credential pool is empty.
    #[error("No credentials configured")]
    NoCredentials,

    /// The adapter or request is misconfigured; retrying cannot help.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use shopscout_search::errors::{FailureClass, SearchError};
    ///
    /// let error = SearchError::QuotaExhausted { credential: "primary".to_string() };
    /// assert_eq!(error.failure_class(), FailureClass::Quota);
    ///
    /// let error = SearchError::InvalidConfig("bad endpoint".to_string());
    /// assert_eq!(error.failure_class(), FailureClass::Terminal);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::QuotaExhausted { .. } | Self::RateLimited { .. } => FailureClass::Quota,

            Self::SourceUnavailable { .. }
            | Self::Http { .. }
            | Self::Timeout { .. }
            | Self::Parse { .. } => FailureClass::Transient,

            Self::AllCredentialsExhausted { .. }
            | Self::NoCredentials
            | Self::InvalidConfig(_) => FailureClass::Terminal,
        }
    }

    /// Build a transport error from a reqwest failure, mapping timeouts to
    /// [`SearchError::Timeout`].
    pub fn from_transport(adapter: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                adapter: adapter.to_string(),
            }
        } else if error.is_decode() {
            Self::Parse {
                adapter: adapter.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::SourceUnavailable {
                adapter: adapter.to_string(),
                message: error.to_string(),
            }
        }
    }
}
