use clap::Parser;
use photomail::{FileSeenStore, GoogleAuth, Settings, SyncOptions};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gphoto-email",
    about = "Email new pictures from a Google Photos album to a fixed address",
    version
)]
pub struct Cli {
    /// Destination email address
    #[arg(long = "to", env = "GPHOTO_EMAIL_TO")]
    pub to_address: Option<String>,

    /// Google Photos album id to watch
    #[arg(long = "album", env = "GPHOTO_EMAIL_ALBUM")]
    pub album_id: Option<String>,

    /// Maximum pictures per email [default: 4]
    #[arg(long)]
    pub batch_size: Option<NonZeroUsize>,

    /// Settings file (default: ~/.config/gphoto-email/settings.json)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    /// File recording already-sent picture ids
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// File holding the OAuth token
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// OAuth client secret JSON from the Google Cloud Console
    #[arg(long)]
    pub client_secret: Option<PathBuf>,

    /// List albums with their ids and exit
    #[arg(long)]
    pub list_albums: bool,

    /// Only authorize (create or refresh the OAuth token) and exit
    #[arg(long)]
    pub auth_only: bool,

    /// Discard the stored OAuth token and authorize again
    #[arg(long)]
    pub reauth: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Sync options, preferring flags and env vars over the settings file
    pub fn sync_options(&self, settings: &Settings) -> SyncOptions {
        let to_address = self
            .to_address
            .clone()
            .or_else(|| settings.to_address.clone())
            .unwrap_or_default();
        let album_id = self
            .album_id
            .clone()
            .or_else(|| settings.album_id.clone())
            .unwrap_or_default();

        let options = SyncOptions::new(to_address, album_id);
        match self.batch_size.or(settings.batch_size) {
            Some(size) => options.with_batch_size(size),
            None => options,
        }
    }

    pub fn state_path(&self, settings: &Settings) -> Option<PathBuf> {
        self.state_file
            .clone()
            .or_else(|| settings.state_file.clone())
            .or_else(FileSeenStore::default_path)
    }

    pub fn token_path(&self, settings: &Settings) -> anyhow::Result<PathBuf> {
        match self.token_file.clone().or_else(|| settings.token_file.clone()) {
            Some(path) => Ok(path),
            None => GoogleAuth::default_token_path(),
        }
    }

    pub fn client_secret_path(&self, settings: &Settings) -> Option<PathBuf> {
        self.client_secret
            .clone()
            .or_else(|| settings.client_secret_file.clone())
    }
}
