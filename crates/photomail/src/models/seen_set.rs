//! Set of media item ids that were already delivered

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::MediaItemId;

/// Durable record of delivered media item ids
///
/// Grows monotonically: there is no way to remove an id once inserted.
/// Backed by a `BTreeSet` so the persisted form is sorted and diffable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet {
    ids: BTreeSet<MediaItemId>,
}

impl SeenSet {
    /// Create an empty seen set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &MediaItemId) -> bool {
        self.ids.contains(id)
    }

    /// Insert an id, returning true if it was not already present
    pub fn insert(&mut self, id: MediaItemId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate ids in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &MediaItemId> {
        self.ids.iter()
    }

    /// Return a new set containing this set's ids plus `ids`
    pub fn union_with<'a>(&self, ids: impl IntoIterator<Item = &'a MediaItemId>) -> Self {
        let mut merged = self.clone();
        merged.extend(ids.into_iter().cloned());
        merged
    }
}

impl Extend<MediaItemId> for SeenSet {
    fn extend<I: IntoIterator<Item = MediaItemId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

impl FromIterator<MediaItemId> for SeenSet {
    fn from_iter<I: IntoIterator<Item = MediaItemId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for SeenSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(MediaItemId::from).collect()
    }
}
