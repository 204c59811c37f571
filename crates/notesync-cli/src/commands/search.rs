use crate::commands::common::{
    format_note_lines, note_to_list_item, open_session, AccountCredentials, NoteListItem,
};
use crate::commands::input::required;
use crate::error::CliError;

pub async fn run_search(
    account: &AccountCredentials,
    query: &str,
    limit: u32,
    offset: u32,
    as_json: bool,
) -> Result<(), CliError> {
    let normalized_query = required(query, CliError::EmptySearchQuery)?;
    let session = open_session(account).await?;
    let results = session
        .search(&normalized_query, limit.max(1), offset)
        .await?;

    if as_json {
        let json_items = results
            .items
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&results.items) {
            println!("{line}");
        }
        let shown = u64::from(offset) + results.items.len() as u64;
        if shown < results.total {
            println!("({} of {} matches)", shown, results.total);
        }
    }

    Ok(())
}
