//! Google Photos Library API client
//!
//! Lists album contents and downloads original image bytes.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use log::debug;

use super::api::{
    Album, ApiMediaItem, ListAlbumsResponse, SearchMediaItemsRequest, SearchMediaItemsResponse,
};
use crate::models::{Credential, MediaItem};
use crate::sync::PhotoSource;

/// Photos Library API client
#[derive(Debug, Default)]
pub struct PhotosClient;

impl PhotosClient {
    const BASE_URL: &'static str = "https://photoslibrary.googleapis.com/v1";

    /// Maximum page size accepted by `mediaItems:search`
    const SEARCH_PAGE_SIZE: u32 = 100;

    /// Maximum page size accepted by `albums.list`
    const ALBUM_PAGE_SIZE: u32 = 50;

    /// Upper bound on a single downloaded image
    const MAX_DOWNLOAD_BYTES: u64 = 200 * 1024 * 1024;

    pub fn new() -> Self {
        Self
    }

    /// Fetch one page of album items
    fn search_page(
        &self,
        album_id: &str,
        page_token: Option<&str>,
        credential: &Credential,
    ) -> Result<SearchMediaItemsResponse> {
        let url = format!("{}/mediaItems:search", Self::BASE_URL);
        let body = SearchMediaItemsRequest {
            album_id,
            page_size: Self::SEARCH_PAGE_SIZE,
            page_token,
        };

        let mut response = ureq::post(&url)
            .header("Authorization", &credential.bearer_header())
            .send_json(&body)
            .context("Failed to send media item search request")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse media item search response")
    }

    /// List every album in the library, following pagination
    pub fn list_albums(&self, credential: &Credential) -> Result<Vec<Album>> {
        let mut albums = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/albums?pageSize={}", Self::BASE_URL, Self::ALBUM_PAGE_SIZE);
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let mut response = ureq::get(&url)
                .header("Authorization", &credential.bearer_header())
                .call()
                .context("Failed to send list albums request")?;

            let page: ListAlbumsResponse = response
                .body_mut()
                .read_json()
                .context("Failed to parse list albums response")?;

            albums.extend(page.albums.unwrap_or_default());

            match next_page(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(albums)
    }
}

impl PhotoSource for PhotosClient {
    fn list_album_items(&self, album_id: &str, credential: &Credential) -> Result<Vec<MediaItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.search_page(album_id, page_token.as_deref(), credential)?;
            items.extend(page.media_items.unwrap_or_default().into_iter().map(to_media_item));
            debug!("Fetched {} album items so far", items.len());

            match next_page(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(items)
    }

    fn fetch_content(&self, item: &MediaItem, credential: &Credential) -> Result<Vec<u8>> {
        let mut response = ureq::get(&item.source_url)
            .header("Authorization", &credential.bearer_header())
            .call()
            .with_context(|| format!("Failed to download {}", item.filename))?;

        response
            .body_mut()
            .with_config()
            .limit(Self::MAX_DOWNLOAD_BYTES)
            .read_to_vec()
            .with_context(|| format!("Failed to read image data for {}", item.filename))
    }
}

/// Token for the following page, if any
///
/// An empty token marks the last page just like a missing one.
fn next_page(token: Option<String>) -> Option<String> {
    token.filter(|token| !token.is_empty())
}

/// Convert an API item to the domain model
///
/// The `=d` suffix on `baseUrl` requests the original bytes.
fn to_media_item(item: ApiMediaItem) -> MediaItem {
    let filename = item.filename.unwrap_or_else(|| item.id.clone());
    MediaItem::new(item.id, filename, format!("{}=d", item.base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_media_item_appends_download_suffix() {
        let item = ApiMediaItem {
            id: "AF1Q".to_string(),
            filename: Some("IMG_0001.JPG".to_string()),
            base_url: "https://lh3.googleusercontent.com/lr/abc".to_string(),
        };

        let media = to_media_item(item);
        assert_eq!(media.id.as_str(), "AF1Q");
        assert_eq!(media.filename, "IMG_0001.JPG");
        assert_eq!(media.source_url, "https://lh3.googleusercontent.com/lr/abc=d");
    }

    #[test]
    fn test_missing_filename_falls_back_to_id() {
        let item = ApiMediaItem {
            id: "AF1Q".to_string(),
            filename: None,
            base_url: "https://example.com/x".to_string(),
        };
        assert_eq!(to_media_item(item).filename, "AF1Q");
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "mediaItems": [
                {"id": "a", "filename": "a.jpg", "baseUrl": "https://x/a", "mimeType": "image/jpeg"},
                {"id": "b", "filename": "b.png", "baseUrl": "https://x/b"}
            ],
            "nextPageToken": "next"
        }"#;
        let page: SearchMediaItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.media_items.unwrap().len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("next"));
    }

    #[test]
    fn test_parse_empty_album_response() {
        let page: SearchMediaItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(page.media_items.is_none());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_empty_page_token_ends_pagination() {
        let page: SearchMediaItemsResponse =
            serde_json::from_str(r#"{"mediaItems": [], "nextPageToken": ""}"#).unwrap();
        assert_eq!(next_page(page.next_page_token), None);

        let albums: ListAlbumsResponse = serde_json::from_str(r#"{"nextPageToken": ""}"#).unwrap();
        assert_eq!(next_page(albums.next_page_token), None);

        assert_eq!(next_page(Some("CAE".to_string())).as_deref(), Some("CAE"));
    }

    #[test]
    fn test_search_request_omits_missing_page_token() {
        let body = SearchMediaItemsRequest {
            album_id: "album",
            page_size: 100,
            page_token: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"albumId":"album","pageSize":100}"#);
    }
}
