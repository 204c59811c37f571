use std::fmt;

use chrono::{DateTime, Utc};
use notesync_core::{timestamp, Note, NoteKey, NoteSession, ServiceConfig};
use serde::Serialize;

use crate::commands::input::non_empty;
use crate::error::CliError;

/// Account email and password as given on the command line or environment.
#[derive(Clone, Default)]
pub struct AccountCredentials {
    email: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AccountCredentials {
    pub fn new(email: Option<String>, password: Option<String>) -> Self {
        Self {
            email: email.and_then(|value| non_empty(&value)),
            password: password.filter(|value| !value.is_empty()),
        }
    }

    pub fn resolve(&self) -> Result<(&str, &str), CliError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(CliError::MissingCredentials),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub key: String,
    pub preview: String,
    pub content: String,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub relative_time: String,
    pub pinned: bool,
    pub deleted: bool,
    pub tags: Vec<String>,
}

/// Build a session from the environment and log in.
pub async fn open_session(account: &AccountCredentials) -> Result<NoteSession, CliError> {
    let (email, password) = account.resolve()?;
    let session = NoteSession::new(ServiceConfig::from_env()?)?;

    if !session.connect(email, password).await? {
        return Err(CliError::LoginRejected(email.to_string()));
    }
    Ok(session)
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let key = note.key().map_or("-", NoteKey::as_str);
            let short_key = key.chars().take(13).collect::<String>();
            let marker = note_marker(note);
            let preview = note_preview(note, 40);
            let relative_time = note
                .modified
                .map_or_else(|| "-".to_string(), |time| format_relative_time(time, now));
            let tags = render_tags(note);

            if tags.is_empty() {
                format!("{short_key:<13} {marker} {preview:<40}  {relative_time}")
            } else {
                format!("{short_key:<13} {marker} {preview:<40}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let mut tags = note.tags.clone();
    tags.sort();

    NoteListItem {
        key: note.key().map(ToString::to_string).unwrap_or_default(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        created: note.created.map(|time| time.to_rfc3339()),
        modified: note.modified.map(|time| time.to_rfc3339()),
        relative_time: note
            .modified
            .map_or_else(String::new, |time| format_relative_time(time, Utc::now())),
        pinned: note.pinned(),
        deleted: note.is_trashed(),
        tags,
    }
}

/// Newest first; notes without a modification time go last.
pub fn sort_by_modified_desc(notes: &mut [Note]) {
    notes.sort_by(|left, right| right.modified.cmp(&left.modified));
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

fn note_marker(note: &Note) -> char {
    if note.is_trashed() {
        'x'
    } else if note.pinned() {
        '*'
    } else {
        ' '
    }
}

pub fn render_tags(note: &Note) -> String {
    let mut tags = note.tags.clone();
    tags.sort();
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Coarse age label such as `5m ago` or `3w ago`.
pub fn format_relative_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);
    let days = elapsed.num_days();

    match (elapsed.num_minutes(), elapsed.num_hours()) {
        (minutes, _) if minutes < 1 => "just now".to_string(),
        (minutes, 0) => format!("{minutes}m ago"),
        (_, hours) if days == 0 => format!("{hours}h ago"),
        _ if days < 7 => format!("{days}d ago"),
        _ if days < 30 => format!("{}w ago", days / 7),
        _ if days < 365 => format!("{}mo ago", days / 30),
        _ => format!("{}y ago", days / 365),
    }
}

/// Accept RFC 3339 (`2024-01-31T12:00:00Z`) or raw epoch seconds.
pub fn parse_since(value: &str) -> Result<DateTime<Utc>, CliError> {
    let trimmed = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(time.with_timezone(&Utc));
    }
    timestamp::decode(trimmed).map_err(|_| CliError::InvalidSince(trimmed.to_string()))
}
