// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LockIn - an encrypted local credential vault.
//!
//! This is the binary entry point for the `lockin` command.

mod commands;
mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lockin_config::LockinConfig;
use lockin_core::LockinError;
use lockin_vault::VaultController;

/// LockIn - an encrypted local credential vault.
#[derive(Parser, Debug)]
#[command(name = "lockin", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a new credential.
    Add(AddArgs),
    /// Show one credential.
    Get {
        /// Credential name (case-insensitive).
        name: String,
        /// Print the password instead of masking it.
        #[arg(long)]
        show: bool,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List all credentials.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Find credentials whose name contains the query.
    Search {
        query: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Change fields of a credential.
    Edit(EditArgs),
    /// Delete a credential.
    Rm {
        /// Credential name (case-insensitive).
        name: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Import credentials from a CSV file with a header row.
    Import {
        /// CSV file with columns name, username, password and optionally url, notes.
        csv: PathBuf,
    },
    /// Show vault and mirror state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Unique credential name.
    pub name: String,
    #[arg(short, long)]
    pub username: String,
    /// Credential password. Prompted for when omitted.
    #[arg(long, env = "LOCKIN_ENTRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Current credential name (case-insensitive).
    pub name: String,
    /// New name.
    #[arg(long, value_name = "NAME")]
    pub rename: Option<String>,
    #[arg(short, long)]
    pub username: Option<String>,
    /// New password. Only taken from the flag so an exported
    /// `LOCKIN_ENTRY_PASSWORD` never rewrites an entry during other edits.
    #[arg(long)]
    pub password: Option<String>,
    /// Prompt for a new password.
    #[arg(long, conflicts_with = "password")]
    pub prompt_password: bool,
    /// New URL. An empty value clears it.
    #[arg(long)]
    pub url: Option<String>,
    /// New notes. An empty value clears them.
    #[arg(long)]
    pub notes: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lockin_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);
    tracing::debug!(
        database = %config.storage.resolved_path().display(),
        mirror = config.mirror.enabled(),
        "config loaded"
    );

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<LockinConfig, Vec<lockin_config::ConfigError>> {
    match path {
        Some(path) => lockin_config::load_and_validate_path(path),
        None => lockin_config::load_and_validate(),
    }
}

async fn run(command: Commands, config: &LockinConfig) -> Result<(), LockinError> {
    let mut vault = VaultController::open(config).await?;
    let result = dispatch(command, &mut vault, config).await;
    let closed = vault.close().await;
    result.and(closed)
}

async fn dispatch(
    command: Commands,
    vault: &mut VaultController,
    config: &LockinConfig,
) -> Result<(), LockinError> {
    if let Commands::Status { json, plain } = command {
        return status::run_status(vault, config, json, plain).await;
    }

    commands::unlock(vault).await?;
    match command {
        Commands::Add(args) => commands::add(vault, args).await,
        Commands::Get { name, show, json } => commands::get(vault, &name, show, json).await,
        Commands::List { json } => commands::list(vault, json).await,
        Commands::Search { query, json } => commands::search(vault, &query, json).await,
        Commands::Edit(args) => commands::edit(vault, args).await,
        Commands::Rm { name, yes } => commands::remove(vault, &name, yes).await,
        Commands::Import { csv } => commands::import(vault, &csv).await,
        Commands::Status { .. } => Ok(()),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so
/// command output on stdout stays scriptable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lockin={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
