//! Client error types

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::schema::SchemaError;

/// Single error value surfaced by every client operation.
///
/// Callers can render [`ClientError::message`] directly; the variant and
/// [`ClientError::status`] are there for the ones that want to branch.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("Network unreachable: {message}")]
    NetworkUnreachable { message: String },

    /// The request was rejected, either locally before sending or by a 4xx.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<String>,
        status: Option<u16>,
    },

    /// 404 from the service.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        details: Option<String>,
    },

    /// 5xx, or a 2xx whose body could not be trusted.
    #[error("Server error: {message}")]
    Server {
        message: String,
        details: Option<String>,
        status: Option<u16>,
    },
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error body returned by the service: `{error, details?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl ClientError {
    /// Human-readable message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NetworkUnreachable { message }
            | Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::Server { message, .. } => message,
        }
    }

    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::NetworkUnreachable { .. } => None,
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Server { details, .. } => details.as_deref(),
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NetworkUnreachable { .. } => None,
            Self::NotFound { .. } => Some(404),
            Self::Validation { status, .. } | Self::Server { status, .. } => *status,
        }
    }

    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnreachable { .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Maps a non-success status and its (possibly undecodable) body.
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let (message, details) = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(ErrorBody { error, details }) => (error, details),
            Err(_) => (
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown Status")
                ),
                None,
            ),
        };

        match status {
            StatusCode::NOT_FOUND => Self::NotFound { message, details },
            s if s.is_client_error() => Self::Validation {
                message,
                details,
                status: Some(s.as_u16()),
            },
            s => Self::Server {
                message,
                details,
                status: Some(s.as_u16()),
            },
        }
    }

    /// A success response whose body failed decoding or validation.
    pub(crate) fn malformed(status: StatusCode, reason: impl ToString) -> Self {
        Self::Server {
            message: "Malformed response body".to_string(),
            details: Some(reason.to_string()),
            status: Some(status.as_u16()),
        }
    }
}

impl From<SchemaError> for ClientError {
    fn from(err: SchemaError) -> Self {
        Self::Validation {
            message: err.to_string(),
            details: None,
            status: None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Validation {
                message: err.to_string(),
                details: None,
                status: None,
            };
        }
        // Body read failures after a status arrived are still server-side.
        if let Some(status) = err.status() {
            return Self::Server {
                message: err.to_string(),
                details: None,
                status: Some(status.as_u16()),
            };
        }
        if err.is_decode() || err.is_body() {
            return Self::Server {
                message: err.to_string(),
                details: None,
                status: None,
            };
        }
        Self::NetworkUnreachable {
            message: err.to_string(),
        }
    }
}
