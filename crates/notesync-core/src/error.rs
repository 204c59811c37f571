//! Error types for notesync-core

use thiserror::Error;

use crate::models::NoteKey;
use crate::transport::TransportError;
use crate::util::excerpt;

/// Result type alias using notesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The service rejected the stored auth token (HTTP 401)
    #[error("Authorization token has expired, is invalid, or has not been set. Re-authenticate with connect().")]
    AuthorizationExpired,

    /// The addressed note does not exist (HTTP 404)
    #[error("No note found for key: {0}")]
    NoteNotFound(NoteKey),

    /// Transport fault or unexpected HTTP status
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A wire value could not be decoded into its target field
    #[error("Cannot decode {field} from value {value:?}")]
    Format { field: &'static str, value: String },

    /// A required argument was missing or out of range
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    /// An authenticated operation was attempted before connect()
    #[error("Not authenticated. Call connect() before issuing note operations.")]
    NotAuthenticated,

    /// Invalid service configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request payload serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) const fn empty_argument(name: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            reason: "value must not be empty",
        }
    }

    pub(crate) fn format(field: &'static str, value: &str) -> Self {
        Self::Format {
            field,
            value: excerpt(value),
        }
    }

    /// Whether the caller must reconnect before retrying.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthorizationExpired | Self::NotAuthenticated)
    }
}

/// Map an HTTP status to the domain error it represents.
///
/// Returns `None` for 2xx. A 404 only becomes [`Error::NoteNotFound`] when the
/// request addressed a specific note key; otherwise it is a plain status failure.
pub fn classify_status(status: u16, key: Option<&NoteKey>, body: &str) -> Option<Error> {
    match (status, key) {
        (200..=299, _) => None,
        (401, _) => Some(Error::AuthorizationExpired),
        (404, Some(key)) => Some(Error::NoteNotFound(key.clone())),
        _ => Some(Error::Transport(TransportError::Status {
            status,
            body: excerpt(body),
        })),
    }
}
