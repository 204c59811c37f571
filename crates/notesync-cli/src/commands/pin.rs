use crate::commands::common::{open_session, AccountCredentials};
use crate::commands::input::required;
use crate::error::CliError;

pub async fn run_set_pinned(
    account: &AccountCredentials,
    key: &str,
    pinned: bool,
) -> Result<(), CliError> {
    let key = required(key, CliError::EmptyNoteKey)?;
    let session = open_session(account).await?;
    let mut note = session.get_note(&key).await?;

    if note.pinned() != pinned {
        note.set_pinned(pinned);
        session.save(&note).await?;
    }
    println!("{key}");
    Ok(())
}
