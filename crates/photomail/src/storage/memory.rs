//! In-memory seen-set storage
//!
//! Used by tests that should not touch the disk.

use anyhow::Result;
use std::sync::RwLock;

use super::SeenStore;
use crate::models::SeenSet;

/// In-memory implementation of SeenStore
///
/// Counts saves so callers can assert whether a run wrote state.
#[derive(Default)]
pub struct InMemorySeenStore {
    seen: RwLock<SeenSet>,
    saves: RwLock<usize>,
}

impl InMemorySeenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `seen`
    pub fn with_seen(seen: SeenSet) -> Self {
        Self {
            seen: RwLock::new(seen),
            saves: RwLock::new(0),
        }
    }

    /// Current contents
    pub fn snapshot(&self) -> SeenSet {
        self.seen.read().unwrap().clone()
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap()
    }
}

impl SeenStore for InMemorySeenStore {
    fn load(&self) -> Result<SeenSet> {
        Ok(self.seen.read().unwrap().clone())
    }

    fn save(&self, seen: &SeenSet) -> Result<()> {
        *self.seen.write().unwrap() = seen.clone();
        *self.saves.write().unwrap() += 1;
        Ok(())
    }
}
