//! Sync engine for forwarding new album photos by email
//!
//! Runs are idempotent: ids are recorded only after their batch was
//! delivered, so a re-run after any failure sends only what is missing.

mod collaborators;
mod engine;
mod error;

pub use collaborators::{CredentialProvider, DeliveryChannel, PhotoSource};
pub use engine::{DEFAULT_BATCH_SIZE, RunReport, SyncOptions, batch, compute_delta, run};
pub use error::{FailureKind, SyncFailure};
