//! Apply a desired-state YAML file

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::Settings;
use crate::desired::DesiredState;
use crate::engine;
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_json, print_warning};
use crate::plan::{ApplyAction, ApplyChange, ApplyResult, ApplySummary};
use crate::state::{StateStore, DEFAULT_STATE_FILE};

/// Apply a desired-state file
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the desired-state YAML file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Path to the state file
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Preview changes without applying
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the apply command
pub async fn execute(args: ApplyArgs, settings: &Settings) -> CliResult<()> {
    let desired = DesiredState::load(&args.file)?;
    desired.validate()?;
    let user_specs = desired.user_specs();
    let account_specs = desired.account_specs();

    let store = StateStore::new(&args.state);
    let mut state = store.load()?;

    let client = settings.connect().await?;
    let users = settings.user_reconciler();
    let accounts = settings.account_reconciler();

    let mut dropped = engine::refresh(&users, &client, &mut state).await?;
    dropped.extend(engine::refresh(&accounts, &client, &mut state).await?);
    if !args.json {
        for name in &dropped {
            print_warning(&format!("'{name}' no longer exists remotely"));
        }
    }
    // Refreshed records are kept even when nothing else changes.
    if !args.dry_run && (!state.is_empty() || !dropped.is_empty()) {
        store.save(&state)?;
    }

    let mut changes = engine::plan(&users, &user_specs, &state);
    changes.extend(engine::plan(&accounts, &account_specs, &state));

    if !changes.iter().any(|c| c.action != ApplyAction::Unchanged) {
        if args.json {
            print_json(&ApplyResult::new(args.dry_run, changes))?;
        } else {
            print_info("No changes required. Appmixer is up to date.");
        }
        return Ok(());
    }

    if !args.json {
        print_planned_changes(&changes, args.dry_run);
    }

    if args.dry_run {
        if args.json {
            print_json(&ApplyResult::new(true, changes))?;
        }
        return Ok(());
    }

    info!(state = %store.path().display(), "Applying changes");
    let mut outcome = engine::apply(
        &users,
        &client,
        &user_specs,
        &mut state,
        &store,
        &mut changes,
        &settings.cancel,
    )
    .await;
    if outcome.is_ok() {
        outcome = engine::apply(
            &accounts,
            &client,
            &account_specs,
            &mut state,
            &store,
            &mut changes,
            &settings.cancel,
        )
        .await;
    }

    let result = ApplyResult::new(false, changes);
    if args.json {
        print_json(&result)?;
    } else {
        print_apply_results(&result);
    }

    outcome?;

    if result.has_failures() {
        return Err(CliError::Reconcile(format!(
            "{} change(s) failed",
            result.summary.failed
        )));
    }

    Ok(())
}

/// Print the planned changes, skipping unchanged entities.
pub fn print_planned_changes(changes: &[ApplyChange], dry_run: bool) {
    if dry_run {
        println!("Dry run - no changes will be made.");
        println!();
        println!("Would apply:");
    } else {
        println!("Planning changes:");
    }

    for change in changes {
        if change.action == ApplyAction::Unchanged {
            continue;
        }

        let color = change.action.color();
        let reset = "\x1b[0m";
        let symbol = change.action.symbol();

        print!("  {color}{symbol}{reset} ");
        print!(
            "{} {}: {}",
            change.action.display(),
            change.resource_type,
            change.name
        );

        if let Some(ref details) = change.details {
            print!(" ({details})");
        }

        println!();
    }

    let summary = ApplySummary::planned(changes);
    println!();
    println!(
        "Summary: {} to create, {} to update, {} to replace, {} to delete, {} unchanged",
        summary.created, summary.updated, summary.replaced, summary.deleted, summary.unchanged
    );
    println!();
}

/// Print results after applying changes
fn print_apply_results(result: &ApplyResult) {
    println!("Applying changes...");

    for change in &result.changes {
        if change.action == ApplyAction::Unchanged {
            continue;
        }

        let (symbol, color) = match change.status.as_deref() {
            Some("success") => ("✓", "\x1b[32m"),
            Some("failed") => ("✗", "\x1b[31m"),
            _ => ("?", "\x1b[33m"),
        };
        let reset = "\x1b[0m";

        let verb = match (change.status.as_deref(), change.action) {
            (Some("success"), ApplyAction::Create) => "Created",
            (Some("success"), ApplyAction::Update) => "Updated",
            (Some("success"), ApplyAction::Replace) => "Replaced",
            (Some("success"), ApplyAction::Delete) => "Deleted",
            (None, _) => "Skipped",
            _ => "Failed",
        };

        print!(
            "  {color}{symbol}{reset} {verb} {}: {}",
            change.resource_type, change.name
        );

        if let Some(ref error) = change.error {
            print!(" - {error}");
        }

        println!();
    }

    println!();

    let total = result.summary.total_changes();
    if result.summary.failed > 0 {
        println!(
            "Applied {total} change(s) with {} failure(s).",
            result.summary.failed
        );
    } else if total > 0 {
        println!("Applied {total} change(s) successfully.");
    }
}
