use notesync_core::{Note, NoteKey};

use crate::commands::common::{open_session, AccountCredentials};
use crate::commands::input::note_text;
use crate::error::CliError;

pub async fn run_add(account: &AccountCredentials, content_parts: &[String]) -> Result<(), CliError> {
    let content = note_text(content_parts, "")?.ok_or(CliError::EmptyContent)?;

    let session = open_session(account).await?;
    let saved = session.save(&Note::new(content)).await?;

    println!("{}", saved.key().map_or("", NoteKey::as_str));
    Ok(())
}
