//! Seen-set storage
//!
//! The trait-based design lets the sync engine run against the JSON file
//! store in production and the in-memory store in tests.

mod file;
mod memory;
mod traits;

pub use file::{FileSeenStore, SeenSetFormatError, STATE_VERSION};
pub use memory::InMemorySeenStore;
pub use traits::SeenStore;
