use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "Read and edit notes on a Simplenote-compatible service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Account email
    #[arg(long, global = true, env = "NOTESYNC_EMAIL", value_name = "EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(
        long,
        global = true,
        env = "NOTESYNC_PASSWORD",
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes, most recently modified first
    #[command(alias = "ls")]
    List {
        /// Number of notes to show
        #[arg(short, long, default_value = "10")]
        limit: u32,
        /// Only notes modified after this time (RFC 3339 or epoch seconds)
        #[arg(long, value_name = "TIME")]
        since: Option<String>,
        /// Walk every index page instead of stopping at --limit
        #[arg(long)]
        all: bool,
        /// Hide notes that sit in the trash
        #[arg(long)]
        no_deleted: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a single note
    Get {
        /// Note key
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content (read from stdin or $EDITOR when omitted)
        content: Vec<String>,
    },
    /// Replace the content of an existing note
    Edit {
        /// Note key
        key: String,
        /// New content (read from stdin or $EDITOR when omitted)
        content: Vec<String>,
    },
    /// Pin a note
    Pin {
        /// Note key
        key: String,
    },
    /// Unpin a note
    Unpin {
        /// Note key
        key: String,
    },
    /// Trash and permanently delete a note
    Delete {
        /// Note key
        key: String,
    },
    /// Full-text search
    Search {
        /// Search query
        query: String,
        /// Number of results to show
        #[arg(short, long, default_value = "10")]
        limit: u32,
        /// Number of results to skip
        #[arg(long, default_value = "0")]
        offset: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
