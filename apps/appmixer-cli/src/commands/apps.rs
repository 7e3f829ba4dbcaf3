//! App catalog commands

use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::{print_json, truncate};

/// App catalog commands
#[derive(Args, Debug)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommands,
}

#[derive(Subcommand, Debug)]
pub enum AppsCommands {
    /// List installed apps
    List(ListArgs),
    /// List the components of one app
    Components(ComponentsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// App ID, e.g. "appmixer.slack"
    pub app: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute app commands
pub async fn execute(args: AppsArgs, settings: &Settings) -> CliResult<()> {
    match args.command {
        AppsCommands::List(a) => execute_list(a, settings).await,
        AppsCommands::Components(a) => execute_components(a, settings).await,
    }
}

async fn execute_list(args: ListArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let apps = client.list_apps().await?;

    if args.json {
        return print_json(&apps);
    }

    if apps.is_empty() {
        println!("No apps found.");
        return Ok(());
    }

    println!("{:<32} {:<24} {:<16} {:<40}", "NAME", "LABEL", "CATEGORY", "DESCRIPTION");
    println!("{}", "-".repeat(115));
    for app in &apps {
        println!(
            "{:<32} {:<24} {:<16} {:<40}",
            truncate(&app.name, 32),
            truncate(&app.label, 24),
            truncate(&app.category, 16),
            truncate(&app.description, 40),
        );
    }
    Ok(())
}

async fn execute_components(args: ComponentsArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let components = client.list_app_components(&args.app).await?;

    if args.json {
        return print_json(&components);
    }

    if components.is_empty() {
        println!("No components found for {}.", args.app);
        return Ok(());
    }

    println!("{:<48} {:<8} {:<50}", "NAME", "WEBHOOK", "DESCRIPTION");
    println!("{}", "-".repeat(108));
    for component in &components {
        println!(
            "{:<48} {:<8} {:<50}",
            truncate(&component.name, 48),
            if component.webhook { "yes" } else { "no" },
            truncate(&component.description, 50),
        );
    }
    Ok(())
}
