//! Configuration loading for the photo bridge
//!
//! Two kinds of configuration live in the config directory:
//! - OAuth client secrets (Google Cloud Console `client_secret.json`, or
//!   `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` environment variables)
//! - `settings.json` with the recipient, album and optional paths

use anyhow::{Context, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Client secrets filename in the config directory
const CLIENT_SECRET_FILE: &str = "client_secret.json";

/// Settings filename in the config directory
const SETTINGS_FILE: &str = "settings.json";

/// OAuth client credentials for the Google APIs
#[derive(Debug, Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientSecrets {
    /// Load client secrets using the following priority:
    /// 1. `path`, when given
    /// 2. ~/.config/gphoto-email/client_secret.json
    /// 3. Environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        if config::config_exists(CLIENT_SECRET_FILE) {
            let creds: GoogleCredentialFile = config::load_json(CLIENT_SECRET_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_env()
    }

    /// Load client secrets from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Desktop apps get "installed", web clients get "web"
        let installed = creds
            .installed
            .or(creds.web)
            .context("Client secret file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Parse client secrets from JSON (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse client secret JSON")?;
        Self::from_credential_file(creds)
    }

    /// Load client secrets from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .context("No client_secret.json found and GOOGLE_CLIENT_ID is not set")?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .context("No client_secret.json found and GOOGLE_CLIENT_SECRET is not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Default client secrets path (~/.config/gphoto-email/client_secret.json)
    pub fn default_path() -> Option<PathBuf> {
        config::config_path(CLIENT_SECRET_FILE)
    }
}

/// Values read from `settings.json`
///
/// Every field is optional here; command-line flags and environment
/// variables take precedence, and required values are checked when the
/// sync options are validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub to_address: Option<String>,
    pub album_id: Option<String>,
    pub batch_size: Option<NonZeroUsize>,
    pub state_file: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
    pub client_secret_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`, or from the config directory when present.
    ///
    /// A missing default settings file yields empty settings; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => config::load_json_file(path),
            None if config::config_exists(SETTINGS_FILE) => config::load_json(SETTINGS_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }
}
