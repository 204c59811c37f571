//! notesync CLI - Command-line client for a Simplenote-compatible note service

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::AccountCredentials;
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::get::run_get;
use crate::commands::list::{run_list, ListOptions};
use crate::commands::pin::run_set_pinned;
use crate::commands::search::run_search;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "warn,notesync=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let account = AccountCredentials::new(cli.email, cli.password);

    match cli.command {
        Commands::List {
            limit,
            since,
            all,
            no_deleted,
            json,
        } => {
            let options = ListOptions {
                limit,
                since,
                all,
                include_deleted: !no_deleted,
                as_json: json,
            };
            run_list(&account, &options).await?;
        }
        Commands::Get { key, json } => run_get(&account, &key, json).await?,
        Commands::Add { content } => run_add(&account, &content).await?,
        Commands::Edit { key, content } => run_edit(&account, &key, &content).await?,
        Commands::Pin { key } => run_set_pinned(&account, &key, true).await?,
        Commands::Unpin { key } => run_set_pinned(&account, &key, false).await?,
        Commands::Delete { key } => run_delete(&account, &key).await?,
        Commands::Search {
            query,
            limit,
            offset,
            json,
        } => run_search(&account, &query, limit, offset, json).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
