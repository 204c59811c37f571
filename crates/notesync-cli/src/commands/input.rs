//! Note text from arguments, piped stdin or an editor session.

use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CliError;

static DRAFT_COUNTER: AtomicU64 = AtomicU64::new(0);

pub const FALLBACK_EDITOR: &str = if cfg!(windows) { "notepad" } else { "vi" };

/// Trimmed text, or `None` when nothing but whitespace is left.
pub fn non_empty(text: &str) -> Option<String> {
    Some(text.trim())
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Trim a required argument; a blank value fails with `missing`.
pub fn required(value: &str, missing: CliError) -> Result<String, CliError> {
    non_empty(value).ok_or(missing)
}

/// Join inline arguments; fall back to piped stdin, then to an editor seeded
/// with `draft`.
pub fn note_text(parts: &[String], draft: &str) -> Result<Option<String>, CliError> {
    if let Some(text) = non_empty(&parts.join(" ")) {
        return Ok(Some(text));
    }
    if let Some(text) = piped_stdin()? {
        return Ok(Some(text));
    }
    EditorSession::from_env().edit(draft)
}

fn piped_stdin() -> Result<Option<String>, CliError> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(non_empty(&buffer))
}

/// One `$VISUAL`/`$EDITOR` run over a scratch file that is removed on drop.
pub struct EditorSession {
    command: String,
    scratch: PathBuf,
}

impl EditorSession {
    pub fn from_env() -> Self {
        let command = ["VISUAL", "EDITOR"]
            .into_iter()
            .find_map(|name| env::var(name).ok().and_then(|value| non_empty(&value)))
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self::with_command(command)
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        let scratch = env::temp_dir().join(format!(
            "notesync-draft-{}-{}-{}.txt",
            std::process::id(),
            DRAFT_COUNTER.fetch_add(1, Ordering::Relaxed),
            chrono::Utc::now().timestamp_millis()
        ));
        Self {
            command: command.into(),
            scratch,
        }
    }

    /// Open the editor on `draft` and return the saved text, if any.
    pub fn edit(self, draft: &str) -> Result<Option<String>, CliError> {
        std::fs::write(&self.scratch, draft)?;

        // The command may carry flags, e.g. "code --wait".
        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| CliError::EditorFailed("empty editor command".into()))?;
        let status = Command::new(program)
            .args(words)
            .arg(&self.scratch)
            .status()?;
        if !status.success() {
            return Err(CliError::EditorFailed(format!(
                "`{}` exited with status {status}",
                self.command
            )));
        }

        Ok(non_empty(&std::fs::read_to_string(&self.scratch)?))
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.scratch);
    }
}
