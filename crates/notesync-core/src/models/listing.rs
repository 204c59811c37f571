//! Paginated index and search result envelopes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Note;

/// Default (and service maximum) page length for index requests.
pub const DEFAULT_INDEX_LENGTH: u32 = 100;

/// Parameters for one index page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub length: u32,
    /// Continuation cursor from a previous [`NoteListing`]
    pub mark: Option<String>,
    /// Only list notes modified after this time
    pub since: Option<DateTime<Utc>>,
    /// Keep entries the server reports as trashed
    pub include_deleted: bool,
}

impl Default for IndexQuery {
    fn default() -> Self {
        Self {
            length: DEFAULT_INDEX_LENGTH,
            mark: None,
            since: None,
            include_deleted: true,
        }
    }
}

impl IndexQuery {
    #[must_use]
    pub const fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.mark = Some(mark.into());
        self
    }

    #[must_use]
    pub const fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    #[must_use]
    pub const fn without_deleted(mut self) -> Self {
        self.include_deleted = false;
        self
    }
}

/// One page of the note index.
///
/// Items are partial notes: typically only key and modification time are
/// populated. Continue with the returned `mark`; pages cannot be requested
/// from an arbitrary position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteListing {
    pub items: Vec<Note>,
    pub mark: Option<String>,
    pub since: Option<DateTime<Utc>>,
    /// Item count as reported by the service
    pub count: Option<u64>,
}

impl NoteListing {
    /// Whether another page is available.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.mark.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for NoteListing {
    type Item = Note;
    type IntoIter = std::vec::IntoIter<Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Results of a full-text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Matching notes (key and content)
    pub items: Vec<Note>,
    /// Total number of matches on the server, across all pages
    pub total: u64,
}
