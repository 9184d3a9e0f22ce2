//! Google API integration
//!
//! This module provides:
//! - OAuth2 authentication flow with a persisted renewable token
//! - Google Photos Library client for listing and downloading album items
//! - Gmail client for sending messages with image attachments
//! - MIME message composition

mod auth;
mod gmail;
mod mime;
mod photos;

pub use auth::GoogleAuth;
pub use gmail::GmailClient;
pub use mime::{MessageDraft, build_message};
pub use photos::PhotosClient;

/// Google REST API response and request types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Request body for `mediaItems:search`
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SearchMediaItemsRequest<'a> {
        pub album_id: &'a str,
        pub page_size: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub page_token: Option<&'a str>,
    }

    /// Response from `mediaItems:search`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SearchMediaItemsResponse {
        pub media_items: Option<Vec<ApiMediaItem>>,
        pub next_page_token: Option<String>,
    }

    /// Media item as returned by the Photos Library API
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiMediaItem {
        pub id: String,
        pub filename: Option<String>,
        pub base_url: String,
    }

    /// Response from listing albums
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListAlbumsResponse {
        pub albums: Option<Vec<Album>>,
        pub next_page_token: Option<String>,
    }

    /// Album summary
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Album {
        pub id: String,
        pub title: Option<String>,
        pub media_items_count: Option<String>,
    }

    /// Request body for Gmail `messages.send`
    #[derive(Debug, Serialize)]
    pub struct SendMessageRequest {
        /// Entire RFC 822 message, base64url encoded
        pub raw: String,
    }

    /// Response from Gmail `messages.send`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SendMessageResponse {
        pub id: String,
        pub thread_id: Option<String>,
    }
}
