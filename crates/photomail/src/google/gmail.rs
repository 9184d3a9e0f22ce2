//! Gmail API HTTP client
//!
//! Sends composed messages through `users.messages.send`.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use log::debug;

use super::api::{SendMessageRequest, SendMessageResponse};
use super::mime::{MessageDraft, build_message};
use crate::models::{Attachment, Credential};
use crate::sync::DeliveryChannel;

/// Gmail API client for sending mail as the authorized user
#[derive(Debug, Default)]
pub struct GmailClient;

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    pub fn new() -> Self {
        Self
    }

    /// Send a raw RFC 822 message
    pub fn send_raw(&self, credential: &Credential, message: &str) -> Result<SendMessageResponse> {
        let url = format!("{}/users/me/messages/send", Self::BASE_URL);
        let body = encode_raw(message);

        let mut response = ureq::post(&url)
            .header("Authorization", &credential.bearer_header())
            .send_json(&body)
            .context("Failed to send message")?;

        let sent: SendMessageResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse send message response")?;

        debug!(
            "Gmail accepted message {} (thread {})",
            sent.id,
            sent.thread_id.as_deref().unwrap_or("-")
        );
        Ok(sent)
    }
}

impl DeliveryChannel for GmailClient {
    fn send(&self, to_address: &str, credential: &Credential, attachments: &[Attachment]) -> Result<()> {
        let message = build_message(&MessageDraft::new(to_address, attachments));
        self.send_raw(credential, &message)?;
        Ok(())
    }
}

/// Wrap a message for the `raw` field (base64url with padding)
fn encode_raw(message: &str) -> SendMessageRequest {
    SendMessageRequest {
        raw: URL_SAFE.encode(message.as_bytes()),
    }
}
