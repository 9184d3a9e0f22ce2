//! JSON file seen-set storage
//!
//! File format (pretty-printed, ids sorted):
//! ```text
//! {
//!   "version": 1,
//!   "updated_at": "2026-10-19T08:00:00Z",
//!   "ids": ["AF1Qip...", "AF1Qiq..."]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::SeenStore;
use crate::models::SeenSet;

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

/// Errors for state files this build cannot read
#[derive(Debug, thiserror::Error)]
pub enum SeenSetFormatError {
    #[error("State file version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Serialize)]
struct StateFileRef<'a> {
    version: u32,
    updated_at: DateTime<Utc>,
    ids: &'a SeenSet,
}

/// Only `ids` is read back; `updated_at` is informational
#[derive(Deserialize)]
struct StateFile {
    ids: SeenSet,
}

/// Seen set stored as a versioned JSON document on disk
pub struct FileSeenStore {
    path: PathBuf,
}

impl FileSeenStore {
    /// Create a store backed by the file at `path` (created on first save)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the default location (~/.config/gphoto-email/uploaded-images.json)
    pub fn default_location() -> Result<Self> {
        let path = Self::default_path().context("Could not determine config directory")?;
        Ok(Self::new(path))
    }

    /// Default state file path
    pub fn default_path() -> Option<PathBuf> {
        config::config_path("uploaded-images.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeenStore for FileSeenStore {
    fn load(&self) -> Result<SeenSet> {
        if !self.path.exists() {
            debug!("No state file at {}, starting empty", self.path.display());
            return Ok(SeenSet::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        let probe: VersionProbe = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;
        if probe.version != STATE_VERSION {
            return Err(SeenSetFormatError::UnsupportedVersion {
                found: probe.version,
                expected: STATE_VERSION,
            }
            .into());
        }

        let state: StateFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;
        debug!("Loaded {} seen ids from {}", state.ids.len(), self.path.display());
        Ok(state.ids)
    }

    fn save(&self, seen: &SeenSet) -> Result<()> {
        let state = StateFileRef {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            ids: seen,
        };
        config::write_json_atomic(&self.path, &state)?;
        debug!("Saved {} seen ids to {}", seen.len(), self.path.display());
        Ok(())
    }
}
