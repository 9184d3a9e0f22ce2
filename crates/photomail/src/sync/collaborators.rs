//! Traits for the external services the sync engine drives

use anyhow::Result;

use crate::models::{Attachment, Credential, MediaItem};

/// Supplies a valid authorization handle
///
/// May perform an interactive authorization step on first use and persist
/// its own renewable token.
pub trait CredentialProvider {
    fn get_credential(&self) -> Result<Credential>;
}

/// Source of album contents
pub trait PhotoSource {
    /// Current full list of items in the album, in the service's order
    fn list_album_items(&self, album_id: &str, credential: &Credential) -> Result<Vec<MediaItem>>;

    /// Download the image bytes for one item
    fn fetch_content(&self, item: &MediaItem, credential: &Credential) -> Result<Vec<u8>>;
}

/// Sends one email with a batch of attachments
pub trait DeliveryChannel {
    fn send(&self, to_address: &str, credential: &Credential, attachments: &[Attachment]) -> Result<()>;
}
