use crate::commands::common::{open_session, AccountCredentials};
use crate::commands::input::required;
use crate::error::CliError;

pub async fn run_delete(account: &AccountCredentials, key: &str) -> Result<(), CliError> {
    let key = required(key, CliError::EmptyNoteKey)?;
    let session = open_session(account).await?;
    // Fetch first so the trash step resends the current content.
    let note = session.get_note(&key).await?;

    if !session.delete_note(&note).await? {
        return Err(CliError::DeleteRefused(key));
    }
    println!("{key}");
    Ok(())
}
