//! Error types for the collector library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all collector operations.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A build plan blob could not be decoded into a plan tree
    #[error("Failed to decode plan{}: {source}", build_suffix(.build_id))]
    PlanDecode {
        build_id: Option<u64>,
        #[source]
        source: serde_json::Error,
    },
    /// An event matched a timing phase but carried no usable origin/time
    #[error("Event '{kind}' does not carry an origin id and timestamp: {source}")]
    EventPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    /// The build event stream was malformed
    #[error("Malformed event stream: {message}")]
    EventStream { message: String },
    /// Transport-level HTTP failures
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a status the client does not handle
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },
    /// Login against the build server failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },
    /// Metrics backend rejected a submission
    #[error("Metrics backend error: {message}")]
    Publish { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory lookup errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {source}")]
    BackgroundTask {
        #[source]
        source: tokio::task::JoinError,
    },
}

fn build_suffix(build_id: &Option<u64>) -> String {
    build_id
        .map(|id| format!(" for build {id}"))
        .unwrap_or_default()
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CollectorError {
        CollectorError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl CollectorError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a configuration error from any displayable message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps a join error from a blocking task.
    pub(crate) fn join(source: tokio::task::JoinError) -> Self {
        Self::BackgroundTask { source }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|source| CollectorError::Database {
            message: message.to_string(),
            source,
        })
    }
}

/// Specialized extension trait for HTTP-related Results.
pub trait HttpResultExt<T> {
    /// Map transport errors with a message.
    fn http_context(self, message: &str) -> Result<T>;
}

impl<T> HttpResultExt<T> for std::result::Result<T, reqwest::Error> {
    fn http_context(self, message: &str) -> Result<T> {
        self.map_err(|source| CollectorError::Http {
            message: message.to_string(),
            source,
        })
    }
}

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, CollectorError>;
