//! Request outcome errors.

use thiserror::Error;

/// Broad class of a failed request, as surfaced to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The endpoint could not be reached or answered with an error status.
    Network,
    /// The endpoint answered but the body had the wrong shape.
    Malformed,
}

/// Why a single request produced no chart update.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response body.
    #[error("request to {path} failed: {source}")]
    Network {
        /// Request path relative to the endpoint.
        path: String,
        /// Underlying transport error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The endpoint answered with a non-success status.
    #[error("request to {path} returned HTTP {status}")]
    Status {
        /// Request path relative to the endpoint.
        path: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body was not the expected JSON document.
    #[error("malformed payload from {path}: {reason}")]
    Malformed {
        /// Request path relative to the endpoint.
        path: String,
        /// What was wrong with the body.
        reason: String,
    },
}

impl FetchError {
    /// Wraps a transport error for `path`.
    pub fn network(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Builds a [`FetchError::Malformed`] for `path`.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Request path the error belongs to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Network { path, .. } | Self::Status { path, .. } | Self::Malformed { path, .. } => {
                path
            }
        }
    }

    /// Whether this is a network or a payload failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } | Self::Status { .. } => FailureKind::Network,
            Self::Malformed { .. } => FailureKind::Malformed,
        }
    }
}
