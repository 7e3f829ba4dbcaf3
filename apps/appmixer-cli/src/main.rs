//! appmixer - reconcile Appmixer users and accounts from a YAML file
//!
//! Connection settings come from flags or `APPMIXER_*` environment variables
//! (a `.env` file in the working directory is loaded first).

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use appmixer_cli::commands;
use appmixer_cli::config::{ConnectionArgs, Settings};
use appmixer_cli::error::CliResult;
use appmixer_cli::logging;

/// appmixer - Appmixer desired-state CLI
#[derive(Parser)]
#[command(name = "appmixer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, update, replace or delete entities to match a YAML file
    Apply(commands::apply::ApplyArgs),

    /// Adopt an existing user or account into the state file
    Import(commands::import::ImportArgs),

    /// Display the authenticated caller
    Whoami(commands::whoami::WhoamiArgs),

    /// Inspect users
    Users(commands::users::UsersArgs),

    /// Inspect accounts
    Accounts(commands::accounts::AccountsArgs),

    /// Inspect the app catalog
    Apps(commands::apps::AppsArgs),
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            on_signal.cancel();
        }
    });

    let settings = Settings::new(cli.connection, cancel);

    match run(cli.command, &settings).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(command: Commands, settings: &Settings) -> CliResult<()> {
    match command {
        Commands::Apply(args) => commands::apply::execute(args, settings).await,
        Commands::Import(args) => commands::import::execute(args, settings).await,
        Commands::Whoami(args) => commands::whoami::execute(args, settings).await,
        Commands::Users(args) => commands::users::execute(args, settings).await,
        Commands::Accounts(args) => commands::accounts::execute(args, settings).await,
        Commands::Apps(args) => commands::apps::execute(args, settings).await,
    }
}
