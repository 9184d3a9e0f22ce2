//! MIME message composition for image attachments

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::models::Attachment;

/// Line length for base64 encoded part bodies (RFC 2045)
const BASE64_LINE_LEN: usize = 76;

/// An email to be rendered as `multipart/mixed`
#[derive(Debug, Clone)]
pub struct MessageDraft<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub subject: &'a str,
    pub attachments: &'a [Attachment],
}

impl<'a> MessageDraft<'a> {
    /// Draft with the default sender ("me", the authorized account) and subject
    pub fn new(to: &'a str, attachments: &'a [Attachment]) -> Self {
        Self {
            to,
            from: "me",
            subject: "Pictures",
            attachments,
        }
    }
}

/// Render a draft into an RFC 822 message
pub fn build_message(draft: &MessageDraft<'_>) -> String {
    render(draft, &boundary())
}

fn render(draft: &MessageDraft<'_>, boundary: &str) -> String {
    let mut out = String::new();
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!("To: {}\r\n", draft.to));
    out.push_str(&format!("From: {}\r\n", draft.from));
    out.push_str(&format!("Subject: {}\r\n", draft.subject));
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
        boundary
    ));

    for attachment in draft.attachments {
        out.push_str(&format!("--{}\r\n", boundary));
        out.push_str(&format!("Content-Type: {}\r\n", attachment.mime_type()));
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; {}\r\n\r\n",
            filename_param(&attachment.filename)
        ));
        push_base64_lines(&mut out, &attachment.data);
    }

    out.push_str(&format!("--{}--\r\n", boundary));
    out
}

/// Encode `data` as base64 wrapped at 76 columns
fn push_base64_lines(out: &mut String, data: &[u8]) {
    let encoded = STANDARD.encode(data);
    // base64 output is ASCII, so byte chunks are valid str boundaries
    for line in encoded.as_bytes().chunks(BASE64_LINE_LEN) {
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push_str("\r\n");
    }
}

/// `filename` parameter, RFC 2231 encoded when it isn't plain ASCII
fn filename_param(filename: &str) -> String {
    let plain = filename
        .chars()
        .all(|c| c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ');
    if plain {
        format!("filename=\"{}\"", filename)
    } else {
        format!("filename*=UTF-8''{}", urlencoding::encode(filename))
    }
}

/// Unique-enough multipart boundary
fn boundary() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    hasher.write_i64(chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
    format!("=_gphoto_{:016x}", hasher.finish())
}
