//! Incremental album-to-email sync

use anyhow::{Context, Result};
use log::{debug, error, info};
use std::num::NonZeroUsize;

use super::{DeliveryChannel, PhotoSource, SyncFailure};
use crate::models::{Attachment, Credential, MediaItem, SeenSet};
use crate::storage::SeenStore;

/// Attachments per email unless configured otherwise
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// Options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Recipient of the picture emails
    pub to_address: String,
    /// Album to watch
    pub album_id: String,
    /// Maximum attachments per email
    pub batch_size: NonZeroUsize,
}

impl SyncOptions {
    pub fn new(to_address: impl Into<String>, album_id: impl Into<String>) -> Self {
        Self {
            to_address: to_address.into(),
            album_id: album_id.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Check that both required values are present and usable
    ///
    /// The address ends up in a message header, so line breaks and other
    /// control characters are rejected.
    pub fn validate(&self) -> Result<(), SyncFailure> {
        if self.to_address.chars().any(char::is_control) {
            return Err(SyncFailure::Config(
                "destination email address contains control characters".to_string(),
            ));
        }

        let mut missing = Vec::new();
        if self.to_address.trim().is_empty() {
            missing.push("destination email address");
        }
        if self.album_id.trim().is_empty() {
            missing.push("album id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncFailure::Config(format!("missing {}", missing.join(" and "))))
        }
    }
}

/// Outcome of a successful sync run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Items currently in the album
    pub items_found: usize,
    /// Items not delivered by any earlier run
    pub new_items: usize,
    /// Items delivered by this run
    pub delivered: usize,
    /// Emails sent by this run
    pub batches_sent: usize,
}

impl RunReport {
    /// True when the album had nothing new
    pub fn nothing_to_do(&self) -> bool {
        self.new_items == 0
    }
}

/// Items whose id is not in `seen`, in their original order
pub fn compute_delta(current_items: &[MediaItem], seen: &SeenSet) -> Vec<MediaItem> {
    current_items
        .iter()
        .filter(|item| !seen.contains(&item.id))
        .cloned()
        .collect()
}

/// Split `items` into consecutive chunks of at most `size`
///
/// Only the last chunk may be short. Empty input yields no chunks.
pub fn batch(items: &[MediaItem], size: NonZeroUsize) -> Vec<&[MediaItem]> {
    items.chunks(size.get()).collect()
}

/// Deliver every album item not yet in the seen set
///
/// The seen set is written at most once. On full success it gains every
/// delivered id. When a batch fails, the ids of batches delivered before
/// it are still committed so they are not sent again; the failed batch
/// and everything after it is retried by the next run.
pub fn run(
    options: &SyncOptions,
    photos: &dyn PhotoSource,
    channel: &dyn DeliveryChannel,
    store: &dyn SeenStore,
    credential: &Credential,
) -> Result<RunReport, SyncFailure> {
    options.validate()?;

    info!("Checking for new images");
    let current = photos
        .list_album_items(&options.album_id, credential)
        .map_err(SyncFailure::Fetch)?;
    let seen = store
        .load()
        .context("Failed to load seen set")
        .map_err(SyncFailure::Persist)?;

    let delta = compute_delta(&current, &seen);
    let mut report = RunReport {
        items_found: current.len(),
        new_items: delta.len(),
        ..Default::default()
    };
    debug!("{} album items, {} already sent", current.len(), seen.len());

    if delta.is_empty() {
        info!("No new images found");
        return Ok(report);
    }
    info!("{} new images found", delta.len());

    let batches = batch(&delta, options.batch_size);
    let total = batches.len();
    let mut delivered: Vec<&MediaItem> = Vec::new();

    for (index, items) in batches.into_iter().enumerate() {
        if let Err(e) = deliver_batch(options, photos, channel, credential, items) {
            commit_partial(store, &seen, &delivered);
            return Err(SyncFailure::Delivery {
                batch: index + 1,
                total,
                delivered: delivered.len(),
                source: e,
            });
        }
        delivered.extend(items);
        report.batches_sent += 1;
        info!("Email sent");
    }

    let updated = seen.union_with(delivered.iter().copied().map(|item| &item.id));
    if let Err(e) = store.save(&updated) {
        error!(
            "Delivered {} images but could not record them; the next run will send them again",
            delivered.len()
        );
        return Err(SyncFailure::Persist(e.context("Failed to save seen set")));
    }

    report.delivered = delivered.len();
    Ok(report)
}

/// Download one batch and send it as a single email
fn deliver_batch(
    options: &SyncOptions,
    photos: &dyn PhotoSource,
    channel: &dyn DeliveryChannel,
    credential: &Credential,
    items: &[MediaItem],
) -> Result<()> {
    info!("Downloading images...");
    let attachments = items
        .iter()
        .map(|item| {
            photos
                .fetch_content(item, credential)
                .map(|data| Attachment::new(item.filename.clone(), data))
        })
        .collect::<Result<Vec<_>>>()?;

    channel.send(&options.to_address, credential, &attachments)
}

/// Record batches delivered before a failure
fn commit_partial(store: &dyn SeenStore, seen: &SeenSet, delivered: &[&MediaItem]) {
    if delivered.is_empty() {
        return;
    }

    let updated = seen.union_with(delivered.iter().copied().map(|item| &item.id));
    match store.save(&updated) {
        Ok(()) => info!("Recorded {} images delivered before the failure", delivered.len()),
        Err(e) => error!(
            "Could not record {} delivered images; the next run will send them again: {:#}",
            delivered.len(),
            e
        ),
    }
}
