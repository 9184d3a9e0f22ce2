//! Domain models for the photo-to-email bridge

mod credential;
mod media_item;
mod seen_set;

pub use credential::Credential;
pub use media_item::{Attachment, ImageFormat, MediaItem, MediaItemId};
pub use seen_set::SeenSet;
