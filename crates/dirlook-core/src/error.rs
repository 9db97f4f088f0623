//! Lookup error types
//!
//! Error definitions with connectivity classification so the caller can
//! print a targeted "check server and credentials" message for transport
//! failures.

use thiserror::Error;

/// Error that can occur while classifying input or querying the directory.
///
/// A DN that resolves to zero entries is not an error — it is a valid
/// empty result, surfaced to the caller as a diagnostic note. Likewise a
/// value that cannot be decoded into its richer form degrades to a
/// hex/decimal rendering instead of raising.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Input matches no recognized identifier shape.
    #[error("unrecognized identifier: {message}")]
    Classification { message: String },

    /// A batch file mixes identifier kinds; rejected in full.
    #[error("mixed identifier kinds in batch: expected {expected}, found {found} on line {line}")]
    MixedBatch {
        expected: String,
        found: String,
        line: usize,
    },

    /// Failed to reach the directory server.
    #[error("connection to {server} failed: {message}")]
    ConnectionFailed {
        server: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server rejected the bind credentials.
    #[error("authentication failed for {server}: invalid credentials")]
    AuthenticationFailed { server: String },

    /// A search failed for a non-connectivity reason.
    #[error("search failed: {message}")]
    SearchFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request is structurally unusable.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl LookupError {
    /// Check whether this error is a connectivity/credentials problem.
    ///
    /// Presentation layers use this to suggest checking the server name
    /// and credentials rather than the query itself.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            LookupError::ConnectionFailed { .. } | LookupError::AuthenticationFailed { .. }
        )
    }

    // Convenience constructors

    /// Create a classification error.
    pub fn classification(message: impl Into<String>) -> Self {
        LookupError::Classification {
            message: message.into(),
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(server: impl Into<String>, message: impl Into<String>) -> Self {
        LookupError::ConnectionFailed {
            server: server.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        server: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LookupError::ConnectionFailed {
            server: server.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a search failed error.
    pub fn search_failed(message: impl Into<String>) -> Self {
        LookupError::SearchFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a search failed error with source.
    pub fn search_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LookupError::SearchFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        LookupError::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Result type for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;
