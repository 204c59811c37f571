use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notesync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Edited note content cannot be empty")]
    EmptyEditedContent,
    #[error("Note key cannot be empty")]
    EmptyNoteKey,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Invalid --since value {0:?}: expected RFC 3339 or epoch seconds")]
    InvalidSince(String),
    #[error("Account credentials missing. Pass --email/--password or set NOTESYNC_EMAIL and NOTESYNC_PASSWORD.")]
    MissingCredentials,
    #[error("Login rejected for {0}. Check the email and password.")]
    LoginRejected(String),
    #[error("Service refused to purge note {0}; it remains in the trash")]
    DeleteRefused(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
}
