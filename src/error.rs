//! Error types for the gallery core.

use std::path::PathBuf;

/// Result type alias for gallery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Normalized failure of a remote fetch.
///
/// Cloneable because a single failure is shared by every caller waiting on
/// the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No route to the server.
    #[error("Unable to reach the server. Check your internet connection.")]
    Connectivity,

    /// The requested resource does not exist (HTTP 404).
    #[error("The requested resource was not found.")]
    NotFound,

    /// Internal server error (HTTP 500).
    #[error("Internal server error. Please try again later.")]
    Server,

    /// Service temporarily unavailable (HTTP 503).
    #[error("Service unavailable. Please try again later.")]
    ServiceUnavailable,

    /// Any other non-success status.
    #[error("Error {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason phrase or response detail.
        message: String,
    },

    /// Malformed request, undecodable body or another local failure.
    #[error("Error: {0}")]
    Client(String),
}

impl FetchError {
    /// Map a non-success HTTP status to its normalized error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            404 => FetchError::NotFound,
            500 => FetchError::Server,
            503 => FetchError::ServiceUnavailable,
            _ => FetchError::Status {
                status,
                message: message.into(),
            },
        }
    }

    /// Stable identifier for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Connectivity => "connectivity",
            FetchError::NotFound => "not-found",
            FetchError::Server => "server",
            FetchError::ServiceUnavailable => "service-unavailable",
            FetchError::Status { .. } => "status",
            FetchError::Client(_) => "client",
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Connectivity | FetchError::Server | FetchError::ServiceUnavailable => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            FetchError::NotFound | FetchError::Client(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            FetchError::Connectivity
        } else if let Some(status) = err.status() {
            FetchError::from_status(status.as_u16(), err.to_string())
        } else {
            FetchError::Client(err.to_string())
        }
    }
}

/// Top-level error type for the gallery core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote fetch failed after exhausting its retry budget.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An argument could not be satisfied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to read a configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values are inconsistent.
    #[error("configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Platform data directory could not be determined.
    #[error("could not determine data directory for this platform")]
    DataDirNotFound,

    /// Key-value storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable identifier for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Fetch(e) => e.kind(),
            Error::InvalidArgument(_) => "invalid-argument",
            Error::ConfigRead { .. } | Error::ConfigParse(_) | Error::ConfigValidation(_) => "config",
            Error::DataDirNotFound | Error::Storage(_) | Error::Io(_) => "storage",
        }
    }
}
