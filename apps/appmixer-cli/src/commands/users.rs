//! Read-only user commands

use appmixer_client::models::user::{DEFAULT_USER_LIMIT, DEFAULT_USER_SORT};
use appmixer_client::models::{UserListQuery, UserResponse};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::{join_or_dash, print_json, print_key_value, truncate, validate_limit};

/// User commands
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommands,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List users (requires admin)
    List(ListArgs),
    /// Count users (requires admin)
    Count(CountArgs),
    /// Show the authenticated user as the API reports it
    Current(JsonArgs),
    /// Get a user by ID
    Get(GetArgs),
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Server-side filter expression, e.g. "scope:admin"
    #[arg(long)]
    pub filter: Option<String>,

    /// Substring matched against username and email
    #[arg(long)]
    pub pattern: Option<String>,

    /// Sort expression
    #[arg(long, default_value = DEFAULT_USER_SORT)]
    pub sort: String,

    /// Maximum number of users to return
    #[arg(long, default_value_t = DEFAULT_USER_LIMIT)]
    pub limit: u32,

    /// Offset for pagination
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn query(&self) -> UserListQuery {
        UserListQuery {
            filter: self.filter.clone(),
            pattern: self.pattern.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// User ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute user commands
pub async fn execute(args: UsersArgs, settings: &Settings) -> CliResult<()> {
    match args.command {
        UsersCommands::List(a) => execute_list(a, settings).await,
        UsersCommands::Count(a) => execute_count(a, settings).await,
        UsersCommands::Current(a) => execute_current(a, settings).await,
        UsersCommands::Get(a) => execute_get(a, settings).await,
    }
}

async fn execute_list(args: ListArgs, settings: &Settings) -> CliResult<()> {
    validate_limit(args.limit)?;
    let client = settings.connect().await?;

    let users = client.list_users(&args.query()).await?;

    if args.json {
        print_json(&users)
    } else if users.is_empty() {
        println!("No users found.");
        Ok(())
    } else {
        print_user_table(&users);
        println!("\nShowing {} user(s) from offset {}", users.len(), args.offset);
        Ok(())
    }
}

async fn execute_count(args: CountArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let count = client.count_users().await?;

    if args.json {
        print_json(&json!({ "count": count }))
    } else {
        println!("{count}");
        Ok(())
    }
}

async fn execute_current(args: JsonArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let user = client.current_user().await?;

    if args.json {
        print_json(&user)
    } else {
        print_user_details(&user);
        Ok(())
    }
}

async fn execute_get(args: GetArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let user = client.get_user(&args.id).await?;

    if args.json {
        print_json(&user)
    } else {
        print_user_details(&user);
        Ok(())
    }
}

fn print_user_table(users: &[UserResponse]) {
    println!(
        "{:<26} {:<24} {:<32} {:<16} {:<6}",
        "ID", "USERNAME", "EMAIL", "SCOPE", "ACTIVE"
    );
    println!("{}", "-".repeat(108));

    for user in users {
        println!(
            "{:<26} {:<24} {:<32} {:<16} {:<6}",
            truncate(&user.id, 26),
            truncate(&user.username, 24),
            truncate(&user.email, 32),
            truncate(&join_or_dash(&user.scope), 16),
            if user.is_active { "yes" } else { "no" }
        );
    }
}

fn print_user_details(user: &UserResponse) {
    println!();
    print_key_value("ID", &user.id);
    print_key_value("Username", &user.username);
    print_key_value("Email", &user.email);
    print_key_value("Active", if user.is_active { "yes" } else { "no" });
    print_key_value("Scope", &join_or_dash(&user.scope));
    print_key_value("Vendor", &join_or_dash(&user.vendor_list()));
    for (key, value) in user.plan_map() {
        print_key_value(&format!("Plan {key}"), &value);
    }
    if !user.created.is_empty() {
        print_key_value("Created", &user.created);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args_build_query() {
        let args = ListArgs {
            filter: Some("scope:admin".into()),
            pattern: None,
            sort: DEFAULT_USER_SORT.into(),
            limit: 5,
            offset: 10,
            json: false,
        };
        let query = args.query();
        assert_eq!(query.filter.as_deref(), Some("scope:admin"));
        assert_eq!(query.limit, 5);
        assert_eq!(query.offset, 10);
    }
}
