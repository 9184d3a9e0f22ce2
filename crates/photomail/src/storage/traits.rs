//! Storage trait definitions

use crate::models::SeenSet;
use anyhow::Result;

/// Durable storage for the set of delivered media item ids
///
/// Both operations act on a single named resource. A resource that does
/// not exist yet loads as the empty set.
pub trait SeenStore {
    /// Load the persisted seen set
    fn load(&self) -> Result<SeenSet>;

    /// Replace the persisted seen set with `seen`
    fn save(&self, seen: &SeenSet) -> Result<()>;
}
