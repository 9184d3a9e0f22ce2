//! Photomail crate - forwards new Google Photos album images by email
//!
//! This crate provides:
//! - Domain models (MediaItem, SeenSet, Attachment, Credential)
//! - Google OAuth, Photos Library and Gmail clients
//! - Seen-set storage behind a trait (JSON file and in-memory)
//! - Idempotent incremental sync engine
//!
//! The sync engine only depends on the collaborator traits, so it runs
//! against fakes in tests without any network access.

pub mod config;
pub mod google;
pub mod models;
pub mod storage;
pub mod sync;

pub use config::{ClientSecrets, Settings};
pub use google::{GmailClient, GoogleAuth, PhotosClient};
pub use models::{Attachment, Credential, ImageFormat, MediaItem, MediaItemId, SeenSet};
pub use storage::{FileSeenStore, InMemorySeenStore, SeenStore};
pub use sync::{
    CredentialProvider, DEFAULT_BATCH_SIZE, DeliveryChannel, FailureKind, PhotoSource, RunReport,
    SyncFailure, SyncOptions, batch, compute_delta, run,
};
