//! Note model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// System tag marking a note as pinned.
pub const PINNED_TAG: &str = "pinned";
/// System tag marking a note as unread.
pub const UNREAD_TAG: &str = "unread";

/// Opaque server-assigned note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteKey(String);

impl NoteKey {
    /// Validate and wrap a key. Blank keys are rejected.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(Error::empty_argument("key"));
        }
        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A note as tracked by the remote service.
///
/// Server-maintained fields (key, counters, share/publish keys) are read-only
/// and only populated from service responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Note {
    pub(crate) key: Option<NoteKey>,
    /// Plain text content
    pub content: String,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
    /// Trash flag. `None` means the flag is not sent at all.
    pub deleted: Option<bool>,
    /// User tags
    pub tags: Vec<String>,
    pub(crate) system_tags: Vec<String>,
    pub(crate) sync_num: Option<u64>,
    pub(crate) version: Option<u64>,
    pub(crate) min_version: Option<u64>,
    pub(crate) share_key: Option<String>,
    pub(crate) publish_key: Option<String>,
}

impl Note {
    /// Create an unsaved note with the given content
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Address an existing server note by key, e.g. to update or delete it
    /// without fetching it first.
    #[must_use]
    pub fn with_key(key: NoteKey, content: impl Into<String>) -> Self {
        Self {
            key: Some(key),
            ..Self::new(content)
        }
    }

    #[must_use]
    pub const fn key(&self) -> Option<&NoteKey> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn system_tags(&self) -> &[String] {
        &self.system_tags
    }

    #[must_use]
    pub const fn sync_num(&self) -> Option<u64> {
        self.sync_num
    }

    #[must_use]
    pub const fn version(&self) -> Option<u64> {
        self.version
    }

    #[must_use]
    pub const fn min_version(&self) -> Option<u64> {
        self.min_version
    }

    #[must_use]
    pub fn share_key(&self) -> Option<&str> {
        self.share_key.as_deref()
    }

    #[must_use]
    pub fn publish_key(&self) -> Option<&str> {
        self.publish_key.as_deref()
    }

    #[must_use]
    pub fn has_system_tag(&self, tag: &str) -> bool {
        self.system_tags.iter().any(|existing| existing == tag)
    }

    /// Add a system tag unless it is already present.
    pub fn insert_system_tag(&mut self, tag: &str) {
        if !self.has_system_tag(tag) {
            self.system_tags.push(tag.to_string());
        }
    }

    /// Remove a system tag. No-op when absent.
    pub fn remove_system_tag(&mut self, tag: &str) {
        self.system_tags.retain(|existing| existing != tag);
    }

    #[must_use]
    pub fn pinned(&self) -> bool {
        self.has_system_tag(PINNED_TAG)
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.set_system_flag(PINNED_TAG, pinned);
    }

    #[must_use]
    pub fn unread(&self) -> bool {
        self.has_system_tag(UNREAD_TAG)
    }

    pub fn set_unread(&mut self, unread: bool) {
        self.set_system_flag(UNREAD_TAG, unread);
    }

    /// Whether the note sits in the server-side trash.
    #[must_use]
    pub fn is_trashed(&self) -> bool {
        self.deleted == Some(true)
    }

    /// Get first line as title preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }

    fn set_system_flag(&mut self, tag: &str, enabled: bool) {
        if enabled {
            self.insert_system_tag(tag);
        } else {
            self.remove_system_tag(tag);
        }
    }
}
