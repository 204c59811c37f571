//! Data models for notesync

mod listing;
mod note;

pub use listing::{IndexQuery, NoteListing, SearchResults, DEFAULT_INDEX_LENGTH};
pub use note::{Note, NoteKey, PINNED_TAG, UNREAD_TAG};
