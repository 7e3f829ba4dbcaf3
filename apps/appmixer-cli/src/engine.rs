//! Plan/apply driver over the reconciler capability trait.
//!
//! Every function is generic over [`StateSlot`], which ties a reconciler to
//! its map in the [`StateFile`]. Users and accounts go through the same code.

use std::collections::BTreeMap;

use appmixer_client::AppmixerClient;
use appmixer_reconciler::{
    AccountRecord, AccountReconciler, AccountSpec, Reconciler, UserRecord, UserReconciler,
    UserSpec,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{CliError, CliResult};
use crate::plan::{ApplyAction, ApplyChange};
use crate::state::{StateFile, StateStore};

/// A reconciler whose records live in one map of the state file.
pub trait StateSlot: Reconciler {
    fn slot(state: &StateFile) -> &BTreeMap<String, Self::Record>;

    fn slot_mut(state: &mut StateFile) -> &mut BTreeMap<String, Self::Record>;

    /// Human-readable reason shown for a planned replacement.
    fn replacement_reason(&self, record: &Self::Record, spec: &Self::Spec) -> String;
}

impl StateSlot for UserReconciler {
    fn slot(state: &StateFile) -> &BTreeMap<String, UserRecord> {
        &state.users
    }

    fn slot_mut(state: &mut StateFile) -> &mut BTreeMap<String, UserRecord> {
        &mut state.users
    }

    fn replacement_reason(&self, record: &UserRecord, spec: &UserSpec) -> String {
        format!("username {} -> {}", record.username, spec.username)
    }
}

impl StateSlot for AccountReconciler {
    fn slot(state: &StateFile) -> &BTreeMap<String, AccountRecord> {
        &state.accounts
    }

    fn slot_mut(state: &mut StateFile) -> &mut BTreeMap<String, AccountRecord> {
        &mut state.accounts
    }

    fn replacement_reason(&self, record: &AccountRecord, spec: &AccountSpec) -> String {
        if record.service != spec.service {
            format!("service {} -> {}", record.service, spec.service)
        } else {
            "token changed".to_string()
        }
    }
}

/// Re-read every record in the slot. Records whose entity is gone are dropped.
///
/// Returns the names that were dropped.
pub async fn refresh<R: StateSlot>(
    reconciler: &R,
    client: &AppmixerClient,
    state: &mut StateFile,
) -> CliResult<Vec<String>> {
    let names: Vec<String> = R::slot(state).keys().cloned().collect();
    let mut dropped = Vec::new();

    for name in names {
        let Some(record) = R::slot(state).get(&name) else {
            continue;
        };
        let observed = reconciler.read(client, record).await?;
        match observed {
            Some(fresh) => {
                R::slot_mut(state).insert(name, fresh);
            }
            None => {
                warn!(kind = reconciler.kind(), name = %name, "Entity gone remotely, dropping from state");
                R::slot_mut(state).remove(&name);
                dropped.push(name);
            }
        }
    }

    Ok(dropped)
}

/// Compare declared specs with the state and list one change per entity.
///
/// Declared entries come first in name order, then deletions for records no
/// longer declared.
pub fn plan<R: StateSlot>(
    reconciler: &R,
    desired: &BTreeMap<String, R::Spec>,
    state: &StateFile,
) -> Vec<ApplyChange> {
    let kind = reconciler.kind();
    let records = R::slot(state);
    let mut changes = Vec::with_capacity(desired.len() + records.len());

    for (name, spec) in desired {
        let change = match records.get(name) {
            None => ApplyChange::create(kind, name),
            Some(record) if reconciler.requires_replacement(record, spec) => {
                ApplyChange::replace(kind, name, &reconciler.replacement_reason(record, spec))
            }
            Some(record) => {
                let fields = reconciler.changed_fields(record, spec);
                if fields.is_empty() {
                    ApplyChange::unchanged(kind, name)
                } else {
                    ApplyChange::update(kind, name, &fields)
                }
            }
        };
        changes.push(change);
    }

    for (name, record) in records {
        if !desired.contains_key(name) {
            changes.push(ApplyChange::delete(kind, name, reconciler.record_id(record)));
        }
    }

    changes
}

/// Execute the pending changes of this reconciler's kind, in order.
///
/// The state file is saved after each successful remote step. A failed
/// entity is marked and the run continues with the next one; cancellation
/// and state-file errors stop the run.
pub async fn apply<R: StateSlot>(
    reconciler: &R,
    client: &AppmixerClient,
    desired: &BTreeMap<String, R::Spec>,
    state: &mut StateFile,
    store: &StateStore,
    changes: &mut [ApplyChange],
    cancel: &CancellationToken,
) -> CliResult<()> {
    let kind = reconciler.kind();

    for change in changes
        .iter_mut()
        .filter(|c| c.resource_type == kind && c.is_pending())
    {
        if cancel.is_cancelled() {
            return Err(CliError::Cancelled(format!(
                "stopped before {} {} '{}'",
                change.action.display().to_lowercase(),
                kind,
                change.name
            )));
        }

        info!(kind, name = %change.name, action = change.action.display(), "Applying change");

        match execute_step(reconciler, client, desired, state, store, change).await {
            Ok(()) => change.mark_success(),
            Err(e) if is_fatal(&e) => {
                change.mark_failed(&e.to_string());
                return Err(e);
            }
            Err(e) => {
                warn!(kind, name = %change.name, error = %e, "Change failed");
                change.mark_failed(&e.to_string());
            }
        }
    }

    Ok(())
}

fn is_fatal(e: &CliError) -> bool {
    matches!(
        e,
        CliError::Cancelled(_) | CliError::Io(_) | CliError::Config(_)
    )
}

async fn execute_step<R: StateSlot>(
    reconciler: &R,
    client: &AppmixerClient,
    desired: &BTreeMap<String, R::Spec>,
    state: &mut StateFile,
    store: &StateStore,
    change: &ApplyChange,
) -> CliResult<()> {
    let name = change.name.as_str();

    match change.action {
        ApplyAction::Create => {
            let spec = declared(desired, name)?;
            let record = reconciler.create(client, spec).await?;
            R::slot_mut(state).insert(name.to_string(), record);
            store.save(state)
        }
        ApplyAction::Update => {
            let spec = declared(desired, name)?;
            let record = recorded::<R>(state, name)?;
            let fresh = reconciler.update(client, record, spec).await?;
            R::slot_mut(state).insert(name.to_string(), fresh);
            store.save(state)
        }
        ApplyAction::Replace => {
            let spec = declared(desired, name)?;
            let record = recorded::<R>(state, name)?;
            reconciler.delete(client, record).await?;
            R::slot_mut(state).remove(name);
            store.save(state)?;

            let record = reconciler.create(client, spec).await?;
            R::slot_mut(state).insert(name.to_string(), record);
            store.save(state)
        }
        ApplyAction::Delete => {
            let record = recorded::<R>(state, name)?;
            reconciler.delete(client, record).await?;
            R::slot_mut(state).remove(name);
            store.save(state)
        }
        ApplyAction::Unchanged | ApplyAction::Failed => Ok(()),
    }
}

fn declared<'a, S>(desired: &'a BTreeMap<String, S>, name: &str) -> CliResult<&'a S> {
    desired
        .get(name)
        .ok_or_else(|| CliError::Validation(format!("'{name}' is not declared")))
}

fn recorded<'a, R: StateSlot>(state: &'a StateFile, name: &str) -> CliResult<&'a R::Record> {
    R::slot(state)
        .get(name)
        .ok_or_else(|| CliError::Validation(format!("'{name}' is not in the state file")))
}

/// Adopt an existing remote entity under `name`.
pub async fn import<R: StateSlot>(
    reconciler: &R,
    client: &AppmixerClient,
    state: &mut StateFile,
    store: &StateStore,
    name: &str,
    id: &str,
) -> CliResult<()> {
    if let Some(existing) = R::slot(state).get(name) {
        return Err(CliError::Validation(format!(
            "{} '{name}' is already managed (id {})",
            reconciler.kind(),
            reconciler.record_id(existing)
        )));
    }

    let record = reconciler.import(client, id).await?;
    R::slot_mut(state).insert(name.to_string(), record);
    store.save(state)
}
