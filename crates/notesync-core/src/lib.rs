//! notesync-core - Core library for notesync
//!
//! This crate contains the note model, the wire codec, and the session client
//! used to talk to a remote note-storage service. Interfaces (the CLI, or any
//! embedding application) only go through [`NoteSession`].

pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod timestamp;
pub mod transport;
pub mod util;

mod wire;

#[cfg(test)]
mod testing;

pub use config::{ServiceConfig, WireEncoding};
pub use error::{Error, Result};
pub use models::{IndexQuery, Note, NoteKey, NoteListing, SearchResults};
pub use session::NoteSession;
pub use transport::{HttpTransport, Transport, TransportError};
