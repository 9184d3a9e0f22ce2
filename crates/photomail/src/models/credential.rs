//! Opaque authorization handle passed through to the Google APIs

use std::fmt;

/// Bearer credential for the photo source and delivery channel
///
/// The sync engine never inspects it. `Debug` is redacted so the token
/// cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(access_token.into())
    }

    /// Raw access token
    pub fn access_token(&self) -> &str {
        &self.0
    }

    /// Value for an HTTP `Authorization` header
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
