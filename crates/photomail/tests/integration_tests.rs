//! Integration tests for the photomail crate
//!
//! These tests drive complete sync runs against in-memory collaborators.

use anyhow::{Result, anyhow};
use photomail::models::{Attachment, Credential, MediaItem, MediaItemId, SeenSet};
use photomail::storage::{FileSeenStore, InMemorySeenStore, SeenStore};
use photomail::sync::{DeliveryChannel, FailureKind, PhotoSource, SyncFailure, SyncOptions, run};
use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use tempfile::TempDir;

/// Album fake returning a fixed listing
struct FakeAlbum {
    items: Vec<MediaItem>,
    fail_listing: bool,
    broken_downloads: Vec<&'static str>,
    listings: Cell<usize>,
}

impl FakeAlbum {
    fn with_ids(ids: &[&str]) -> Self {
        Self {
            items: ids
                .iter()
                .map(|id| MediaItem::new(*id, format!("{}.jpg", id), format!("https://photos/{}=d", id)))
                .collect(),
            fail_listing: false,
            broken_downloads: Vec::new(),
            listings: Cell::new(0),
        }
    }
}

impl PhotoSource for FakeAlbum {
    fn list_album_items(&self, album_id: &str, _credential: &Credential) -> Result<Vec<MediaItem>> {
        self.listings.set(self.listings.get() + 1);
        assert_eq!(album_id, "album-1");
        if self.fail_listing {
            return Err(anyhow!("503 Service Unavailable"));
        }
        Ok(self.items.clone())
    }

    fn fetch_content(&self, item: &MediaItem, _credential: &Credential) -> Result<Vec<u8>> {
        if self.broken_downloads.iter().any(|id| *id == item.id.as_str()) {
            return Err(anyhow!("download of {} failed", item.id));
        }
        let mut data = vec![0xFF, 0xD8, 0xFF];
        data.extend_from_slice(item.id.as_str().as_bytes());
        Ok(data)
    }
}

/// Mailbox fake recording the attachment names of every email
#[derive(Default)]
struct FakeMailbox {
    sent: RefCell<Vec<Vec<String>>>,
    /// 1-based call number that should fail
    fail_on_call: Option<usize>,
    calls: Cell<usize>,
}

impl FakeMailbox {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<Vec<String>> {
        self.sent.borrow().clone()
    }
}

impl DeliveryChannel for FakeMailbox {
    fn send(&self, to_address: &str, _credential: &Credential, attachments: &[Attachment]) -> Result<()> {
        assert_eq!(to_address, "frame@example.com");
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if self.fail_on_call == Some(call) {
            return Err(anyhow!("Gmail rejected message"));
        }
        self.sent
            .borrow_mut()
            .push(attachments.iter().map(|a| a.filename.clone()).collect());
        Ok(())
    }
}

/// Store whose writes always fail
struct ReadOnlyStore(SeenSet);

impl SeenStore for ReadOnlyStore {
    fn load(&self) -> Result<SeenSet> {
        Ok(self.0.clone())
    }

    fn save(&self, _seen: &SeenSet) -> Result<()> {
        Err(anyhow!("read-only file system"))
    }
}

fn options() -> SyncOptions {
    SyncOptions::new("frame@example.com", "album-1")
}

fn credential() -> Credential {
    Credential::new("test-token")
}

fn seen(ids: &[&str]) -> SeenSet {
    ids.iter().copied().collect()
}

fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| format!("{}.jpg", id)).collect()
}

#[test]
fn test_delivers_delta_in_batches() {
    let album = FakeAlbum::with_ids(&["a", "b", "c", "d", "e", "f"]);
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::with_seen(seen(&["a"]));

    let report = run(&options(), &album, &mailbox, &store, &credential()).unwrap();

    assert_eq!(report.items_found, 6);
    assert_eq!(report.new_items, 5);
    assert_eq!(report.delivered, 5);
    assert_eq!(report.batches_sent, 2);
    assert_eq!(mailbox.sent(), vec![names(&["b", "c", "d", "e"]), names(&["f"])]);
    assert_eq!(store.snapshot(), seen(&["a", "b", "c", "d", "e", "f"]));
    assert_eq!(store.save_count(), 1);
}

#[test]
fn test_second_run_is_idempotent() {
    let album = FakeAlbum::with_ids(&["a", "b", "c"]);
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::new();

    let first = run(&options(), &album, &mailbox, &store, &credential()).unwrap();
    let second = run(&options(), &album, &mailbox, &store, &credential()).unwrap();

    assert_eq!(first.delivered, 3);
    assert_eq!(second.delivered, 0);
    assert!(second.nothing_to_do());
    assert_eq!(mailbox.sent().len(), 1);
    assert_eq!(store.save_count(), 1);
}

#[test]
fn test_empty_album_writes_nothing() {
    let album = FakeAlbum::with_ids(&[]);
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::new();

    let report = run(&options(), &album, &mailbox, &store, &credential()).unwrap();

    assert!(report.nothing_to_do());
    assert_eq!(report.items_found, 0);
    assert!(mailbox.sent().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_missing_recipient_is_config_error_before_any_call() {
    let album = FakeAlbum::with_ids(&["a"]);
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::new();
    let options = SyncOptions::new("", "album-1");

    let err = run(&options, &album, &mailbox, &store, &credential()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Config);
    assert_eq!(album.listings.get(), 0);
    assert!(mailbox.sent().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_recipient_with_line_break_sends_nothing() {
    let album = FakeAlbum::with_ids(&["a"]);
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::new();
    let options = SyncOptions::new("frame@example.com\r\nBcc: other@example.com", "album-1");

    let err = run(&options, &album, &mailbox, &store, &credential()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Config);
    assert_eq!(album.listings.get(), 0);
    assert!(mailbox.sent().is_empty());
}

#[test]
fn test_fetch_failure_commits_nothing() {
    let mut album = FakeAlbum::with_ids(&["a"]);
    album.fail_listing = true;
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::new();

    let err = run(&options(), &album, &mailbox, &store, &credential()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Fetch);
    assert!(format!("{:#}", anyhow::Error::from(err)).contains("503"));
    assert!(mailbox.sent().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_delivery_failure_commits_only_earlier_batches() {
    let album = FakeAlbum::with_ids(&["a", "b", "c", "d", "e", "f", "g"]);
    let mailbox = FakeMailbox::failing_on(3);
    let store = InMemorySeenStore::new();
    let options = options().with_batch_size(NonZeroUsize::new(2).unwrap());

    let err = run(&options, &album, &mailbox, &store, &credential()).unwrap_err();

    match &err {
        SyncFailure::Delivery {
            batch,
            total,
            delivered,
            ..
        } => {
            assert_eq!(*batch, 3);
            assert_eq!(*total, 4);
            assert_eq!(*delivered, 4);
        }
        other => panic!("expected delivery failure, got {other:?}"),
    }
    assert_eq!(store.snapshot(), seen(&["a", "b", "c", "d"]));
    assert_eq!(store.save_count(), 1);

    // The next run picks up exactly the failed and undelivered batches
    let retry_mailbox = FakeMailbox::default();
    let report = run(&options, &album, &retry_mailbox, &store, &credential()).unwrap();
    assert_eq!(report.delivered, 3);
    assert_eq!(retry_mailbox.sent(), vec![names(&["e", "f"]), names(&["g"])]);
}

#[test]
fn test_first_batch_failure_writes_nothing() {
    let album = FakeAlbum::with_ids(&["a", "b"]);
    let mailbox = FakeMailbox::failing_on(1);
    let store = InMemorySeenStore::with_seen(seen(&["z"]));

    let err = run(&options(), &album, &mailbox, &store, &credential()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Delivery);
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.snapshot(), seen(&["z"]));
}

#[test]
fn test_download_failure_is_delivery_failure() {
    let mut album = FakeAlbum::with_ids(&["a", "b", "c", "d", "e"]);
    album.broken_downloads = vec!["e"];
    let mailbox = FakeMailbox::default();
    let store = InMemorySeenStore::new();

    let err = run(&options(), &album, &mailbox, &store, &credential()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Delivery);
    assert_eq!(mailbox.sent(), vec![names(&["a", "b", "c", "d"])]);
    assert_eq!(store.snapshot(), seen(&["a", "b", "c", "d"]));
}

#[test]
fn test_persist_failure_is_surfaced() {
    let album = FakeAlbum::with_ids(&["a"]);
    let mailbox = FakeMailbox::default();
    let store = ReadOnlyStore(SeenSet::new());

    let err = run(&options(), &album, &mailbox, &store, &credential()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Persist);
    assert!(format!("{:#}", anyhow::Error::from(err)).contains("read-only file system"));
    assert_eq!(mailbox.sent().len(), 1);
}

#[test]
fn test_file_store_round_trip_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uploaded-images.json");
    let album = FakeAlbum::with_ids(&["p1", "p2"]);

    let first = run(
        &options(),
        &album,
        &FakeMailbox::default(),
        &FileSeenStore::new(&path),
        &credential(),
    )
    .unwrap();
    assert_eq!(first.delivered, 2);

    // A fresh store instance reads what the previous run committed
    let store = FileSeenStore::new(&path);
    assert!(store.load().unwrap().contains(&MediaItemId::new("p2")));

    let mailbox = FakeMailbox::default();
    let second = run(&options(), &album, &mailbox, &store, &credential()).unwrap();
    assert!(second.nothing_to_do());
    assert!(mailbox.sent().is_empty());
}
