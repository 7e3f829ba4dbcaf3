//! Planned and applied changes.

use serde::{Deserialize, Serialize};

/// Action to be taken for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyAction {
    /// Not in state yet; will be created
    Create,
    /// In state; mutable fields will be updated in place
    Update,
    /// In state; an immutable field changed, so delete then create
    Replace,
    /// In state but no longer declared; will be deleted
    Delete,
    /// In state and matches the declaration
    Unchanged,
    /// Operation failed
    Failed,
}

impl ApplyAction {
    /// Returns the symbol for this action
    pub fn symbol(&self) -> &'static str {
        match self {
            ApplyAction::Create => "+",
            ApplyAction::Update => "~",
            ApplyAction::Replace => "±",
            ApplyAction::Delete => "-",
            ApplyAction::Unchanged => "=",
            ApplyAction::Failed => "✗",
        }
    }

    /// Returns the display name for this action
    pub fn display(&self) -> &'static str {
        match self {
            ApplyAction::Create => "Create",
            ApplyAction::Update => "Update",
            ApplyAction::Replace => "Replace",
            ApplyAction::Delete => "Delete",
            ApplyAction::Unchanged => "No changes",
            ApplyAction::Failed => "Failed",
        }
    }

    /// Returns the color code for this action
    pub fn color(&self) -> &'static str {
        match self {
            ApplyAction::Create => "\x1b[32m",    // Green
            ApplyAction::Update => "\x1b[33m",    // Yellow
            ApplyAction::Replace => "\x1b[35m",   // Magenta
            ApplyAction::Delete => "\x1b[31m",    // Red
            ApplyAction::Unchanged => "\x1b[90m", // Gray
            ApplyAction::Failed => "\x1b[31m",    // Red
        }
    }
}

/// One entity-level step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyChange {
    pub action: ApplyAction,
    /// "user" or "account"
    pub resource_type: String,
    /// Entry name in the desired-state file
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// "success", "failed", or None while pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyChange {
    fn new(action: ApplyAction, resource_type: &str, name: &str, details: Option<String>) -> Self {
        Self {
            action,
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            details,
            status: None,
            error: None,
        }
    }

    pub fn create(resource_type: &str, name: &str) -> Self {
        Self::new(ApplyAction::Create, resource_type, name, None)
    }

    pub fn update(resource_type: &str, name: &str, fields: &[&str]) -> Self {
        Self::new(
            ApplyAction::Update,
            resource_type,
            name,
            Some(format!("changed: {}", fields.join(", "))),
        )
    }

    pub fn replace(resource_type: &str, name: &str, reason: &str) -> Self {
        Self::new(
            ApplyAction::Replace,
            resource_type,
            name,
            Some(reason.to_string()),
        )
    }

    pub fn delete(resource_type: &str, name: &str, id: &str) -> Self {
        Self::new(
            ApplyAction::Delete,
            resource_type,
            name,
            Some(format!("id {id}")),
        )
    }

    pub fn unchanged(resource_type: &str, name: &str) -> Self {
        let mut change = Self::new(ApplyAction::Unchanged, resource_type, name, None);
        change.status = Some("success".to_string());
        change
    }

    pub fn mark_success(&mut self) {
        self.status = Some("success".to_string());
    }

    /// Mark as failed with error
    pub fn mark_failed(&mut self, error: &str) {
        self.action = ApplyAction::Failed;
        self.status = Some("failed".to_string());
        self.error = Some(error.to_string());
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.is_none()
    }
}

/// Summary of an apply run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ApplySummary {
    /// Count only steps that finished successfully.
    pub fn from_changes(changes: &[ApplyChange]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            let done = change.status.as_deref() == Some("success");
            match change.action {
                ApplyAction::Failed => summary.failed += 1,
                ApplyAction::Unchanged => summary.unchanged += 1,
                action if done => summary.bump(action),
                _ => {}
            }
        }
        summary
    }

    /// Count planned steps (before apply).
    pub fn planned(changes: &[ApplyChange]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            summary.bump(change.action);
        }
        summary
    }

    fn bump(&mut self, action: ApplyAction) {
        match action {
            ApplyAction::Create => self.created += 1,
            ApplyAction::Update => self.updated += 1,
            ApplyAction::Replace => self.replaced += 1,
            ApplyAction::Delete => self.deleted += 1,
            ApplyAction::Unchanged => self.unchanged += 1,
            ApplyAction::Failed => self.failed += 1,
        }
    }

    /// Total number of changes (excluding unchanged and failed)
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.deleted
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

/// Complete result of an apply run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub dry_run: bool,
    pub changes: Vec<ApplyChange>,
    pub summary: ApplySummary,
}

impl ApplyResult {
    pub fn new(dry_run: bool, changes: Vec<ApplyChange>) -> Self {
        let summary = if dry_run {
            ApplySummary::planned(&changes)
        } else {
            ApplySummary::from_changes(&changes)
        };
        Self {
            dry_run,
            changes,
            summary,
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}
