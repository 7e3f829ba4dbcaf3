//! Whoami command - show the authenticated caller

use appmixer_client::{has_scope, AppmixerClient, ADMIN_SCOPE};
use clap::Args;
use serde::Serialize;

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::{join_or_dash, print_json, print_key_value};

/// Arguments for the whoami command
#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for whoami
#[derive(Debug, Serialize)]
pub struct WhoamiOutput {
    pub id: String,
    pub username: String,
    pub email: String,
    pub scope: Vec<String>,
    pub is_admin: bool,
    pub api_url: String,
}

impl From<&AppmixerClient> for WhoamiOutput {
    fn from(client: &AppmixerClient) -> Self {
        let session = client.session();
        let user = session.user();
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            scope: session.scope().to_vec(),
            is_admin: has_scope(session, ADMIN_SCOPE),
            api_url: session.base_url().to_string(),
        }
    }
}

/// Execute the whoami command
pub async fn execute(args: WhoamiArgs, settings: &Settings) -> CliResult<()> {
    let client = settings.connect().await?;
    let output = WhoamiOutput::from(&client);

    if args.json {
        return print_json(&output);
    }

    println!();
    print_key_value("User ID", &output.id);
    print_key_value("Username", &output.username);
    print_key_value("Email", &output.email);
    print_key_value("Scope", &join_or_dash(&output.scope));
    print_key_value("Admin", if output.is_admin { "yes" } else { "no" });
    print_key_value("API", &output.api_url);
    println!();

    Ok(())
}
