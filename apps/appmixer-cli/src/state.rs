//! Local state file: reconciled records keyed by entry name.
//!
//! Written atomically (temp file in the same directory, then rename). The
//! file holds user passwords; on Unix the temp file, and so the result, is
//! owner-readable only.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use appmixer_reconciler::{AccountRecord, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Default state file name, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "appmixer.state.json";

const STATE_VERSION: u32 = 1;

fn default_version() -> u32 {
    STATE_VERSION
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,

    #[serde(default)]
    pub accounts: BTreeMap<String, AccountRecord>,
}

impl StateFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.accounts.is_empty()
    }
}

/// Location of the state file on disk.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state; a missing file is an empty state.
    pub fn load(&self) -> CliResult<StateFile> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No state file yet");
            return Ok(StateFile::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            CliError::Config(format!(
                "Invalid state file {}: {e}",
                self.path.display()
            ))
        })?;

        if state.version != STATE_VERSION {
            return Err(CliError::Config(format!(
                "Unsupported state file version {} in {}",
                state.version,
                self.path.display()
            )));
        }
        Ok(state)
    }

    /// Write the state atomically.
    pub fn save(&self, state: &StateFile) -> CliResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(state)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CliError::Io(e.to_string()))?;

        debug!(path = %self.path.display(), "State saved");
        Ok(())
    }
}
