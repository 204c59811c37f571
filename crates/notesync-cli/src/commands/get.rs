use crate::commands::common::{note_to_list_item, open_session, AccountCredentials};
use crate::commands::input::required;
use crate::error::CliError;

pub async fn run_get(account: &AccountCredentials, key: &str, as_json: bool) -> Result<(), CliError> {
    let key = required(key, CliError::EmptyNoteKey)?;
    let session = open_session(account).await?;
    let note = session.get_note(&key).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note_to_list_item(&note))?);
    } else {
        println!("{}", note.content);
    }
    Ok(())
}
