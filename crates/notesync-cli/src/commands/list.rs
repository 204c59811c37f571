use notesync_core::{IndexQuery, Note, NoteSession};

use crate::commands::common::{
    format_note_lines, note_to_list_item, open_session, parse_since, sort_by_modified_desc,
    AccountCredentials, NoteListItem,
};
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub limit: u32,
    pub since: Option<String>,
    pub all: bool,
    pub include_deleted: bool,
    pub as_json: bool,
}

impl ListOptions {
    pub fn index_query(&self) -> Result<IndexQuery, CliError> {
        let mut query = IndexQuery::default();
        if !self.all {
            query = query.with_length(self.limit.max(1));
        }
        if let Some(since) = self.since.as_deref() {
            query = query.with_since(parse_since(since)?);
        }
        if !self.include_deleted {
            query = query.without_deleted();
        }
        Ok(query)
    }
}

pub async fn run_list(account: &AccountCredentials, options: &ListOptions) -> Result<(), CliError> {
    let query = options.index_query()?;
    let session = open_session(account).await?;

    let entries = if options.all {
        session.get_full_index(query).await?
    } else {
        session.get_index(&query).await?.items
    };
    let mut notes = fetch_full_notes(&session, entries).await?;
    sort_by_modified_desc(&mut notes);

    if options.as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}

/// Index entries only carry key and timestamps; fetch each body.
async fn fetch_full_notes(
    session: &NoteSession,
    entries: Vec<Note>,
) -> Result<Vec<Note>, CliError> {
    tracing::debug!(count = entries.len(), "Fetching note bodies for listing");
    let mut notes = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(key) = entry.key() else {
            continue;
        };
        notes.push(session.get_note(key.as_str()).await?);
    }
    Ok(notes)
}
