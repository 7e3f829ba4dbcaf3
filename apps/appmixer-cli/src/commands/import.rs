//! Import an existing user or account into the state file

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::config::Settings;
use crate::engine;
use crate::error::CliResult;
use crate::output::print_success;
use crate::state::{StateStore, DEFAULT_STATE_FILE};

/// Kind of entity to import
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    User,
    Account,
}

/// Adopt an existing remote entity under a name from the desired-state file
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Entity kind
    #[arg(value_enum)]
    pub kind: ImportKind,

    /// Entry name to record it under
    pub name: String,

    /// Remote ID
    pub id: String,

    /// Path to the state file
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,
}

/// Execute the import command
pub async fn execute(args: ImportArgs, settings: &Settings) -> CliResult<()> {
    let store = StateStore::new(&args.state);
    let mut state = store.load()?;
    let client = settings.connect().await?;

    match args.kind {
        ImportKind::User => {
            let users = settings.user_reconciler();
            engine::import(&users, &client, &mut state, &store, &args.name, &args.id).await?;
        }
        ImportKind::Account => {
            let accounts = settings.account_reconciler();
            engine::import(&accounts, &client, &mut state, &store, &args.name, &args.id).await?;
        }
    }

    print_success(&format!(
        "Imported {} '{}' (id {}) into {}",
        match args.kind {
            ImportKind::User => "user",
            ImportKind::Account => "account",
        },
        args.name,
        args.id,
        store.path().display()
    ));
    Ok(())
}
