//! Read-only account commands

use appmixer_client::models::AccountResponse;
use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::{print_json, print_key_value, truncate};

/// Account commands
#[derive(Args, Debug)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountsCommands,
}

#[derive(Subcommand, Debug)]
pub enum AccountsCommands {
    /// List the caller's accounts
    List(ListArgs),
    /// Get an account by ID
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Server-side filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Account ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute account commands
pub async fn execute(args: AccountsArgs, settings: &Settings) -> CliResult<()> {
    match args.command {
        AccountsCommands::List(a) => execute_list(a, settings).await,
        AccountsCommands::Get(a) => execute_get(a, settings).await,
    }
}

async fn execute_list(args: ListArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let accounts = client.list_accounts(args.filter.as_deref()).await?;

    if args.json {
        return print_json(&accounts);
    }

    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    println!(
        "{:<26} {:<28} {:<32} {:<24}",
        "ID", "SERVICE", "NAME", "DISPLAY NAME"
    );
    println!("{}", "-".repeat(112));
    for account in &accounts {
        println!(
            "{:<26} {:<28} {:<32} {:<24}",
            truncate(&account.account_id, 26),
            truncate(&account.service, 28),
            truncate(&account.name, 32),
            truncate(&account.display_name_or_empty(), 24),
        );
    }
    println!("\n{} account(s)", accounts.len());
    Ok(())
}

async fn execute_get(args: GetArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let account = client.get_account(&args.id).await?;

    if args.json {
        print_json(&account)
    } else {
        print_account_details(&account);
        Ok(())
    }
}

fn print_account_details(account: &AccountResponse) {
    println!();
    print_key_value("ID", &account.account_id);
    print_key_value("Service", &account.service);
    print_key_value("Name", &account.name);
    print_key_value("Display name", &account.display_name_or_empty());
    print_key_value("User ID", &account.user_id);
    for (key, value) in account.profile_info_strings() {
        print_key_value(&format!("Profile {key}"), &value);
    }
    println!();
}
