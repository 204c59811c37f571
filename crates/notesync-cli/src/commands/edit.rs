use crate::commands::common::{open_session, AccountCredentials};
use crate::commands::input::{note_text, required};
use crate::error::CliError;

pub async fn run_edit(
    account: &AccountCredentials,
    key: &str,
    content_parts: &[String],
) -> Result<(), CliError> {
    let key = required(key, CliError::EmptyNoteKey)?;
    let session = open_session(account).await?;
    let mut note = session.get_note(&key).await?;

    let edited_content =
        note_text(content_parts, &note.content)?.ok_or(CliError::EmptyEditedContent)?;

    if edited_content == note.content {
        println!("{key}");
        return Ok(());
    }

    note.content = edited_content;
    session.save(&note).await?;
    println!("{key}");
    Ok(())
}
