//! gphoto-email - forwards new Google Photos album pictures by email
//!
//! Meant to run from cron or a systemd timer. Each run sends only the
//! pictures that no earlier run delivered.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use photomail::{
    ClientSecrets, CredentialProvider, FailureKind, FileSeenStore, GmailClient, GoogleAuth,
    PhotosClient, Settings, SyncFailure,
};

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            exit_code(&e)
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config_file.as_deref())?;

    // Required values are checked before anything touches the network or disk.
    // Directories are only created when the token or state is saved.
    let options = cli.sync_options(&settings);
    if !cli.list_albums && !cli.auth_only {
        options.validate().inspect_err(|_| {
            error!(
                "Please set the destination address and album id \
                 (--to/--album, GPHOTO_EMAIL_TO/GPHOTO_EMAIL_ALBUM, or settings.json). Exiting."
            )
        })?;
    }

    let secrets = match ClientSecrets::load(cli.client_secret_path(&settings).as_deref()) {
        Ok(secrets) => secrets,
        Err(e) => {
            if let Some(path) = ClientSecrets::default_path() {
                warn!(
                    "To configure Google access, either:\n\
                     1. Place your OAuth client secret JSON at: {}\n\
                     2. Or set environment variables: GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET",
                    path.display()
                );
            }
            return Err(e.context("OAuth client secrets not found"));
        }
    };
    let auth = GoogleAuth::new(&secrets, cli.token_path(&settings)?);
    if cli.reauth {
        auth.logout()?;
    }
    let credential = auth.get_credential().context("Authorization failed")?;

    if cli.auth_only {
        info!("Authorization complete");
        return Ok(());
    }

    let photos = PhotosClient::new();
    if cli.list_albums {
        for album in photos.list_albums(&credential)? {
            println!(
                "{}\t{}\t{} items",
                album.id,
                album.title.as_deref().unwrap_or("(untitled)"),
                album.media_items_count.as_deref().unwrap_or("0"),
            );
        }
        return Ok(());
    }

    let state_path = cli
        .state_path(&settings)
        .context("Could not determine state file location")?;
    let store = FileSeenStore::new(state_path);

    let report = photomail::run(&options, &photos, &GmailClient::new(), &store, &credential)?;
    if !report.nothing_to_do() {
        info!(
            "Delivered {} of {} album images in {} emails",
            report.delivered, report.items_found, report.batches_sent
        );
    }
    Ok(())
}

/// Distinct exit status per failure kind so schedulers can alert on it
fn exit_code(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<SyncFailure>().map(SyncFailure::kind) {
        Some(FailureKind::Config) => ExitCode::from(2),
        Some(FailureKind::Fetch) => ExitCode::from(3),
        Some(FailureKind::Delivery) => ExitCode::from(4),
        Some(FailureKind::Persist) => ExitCode::from(5),
        None => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let config = anyhow::Error::from(SyncFailure::Config("missing album id".into()));
        assert_eq!(exit_code(&config), ExitCode::from(2));

        let persist = anyhow::Error::from(SyncFailure::Persist(anyhow::anyhow!("disk full")));
        assert_eq!(exit_code(&persist), ExitCode::from(5));

        assert_eq!(exit_code(&anyhow::anyhow!("auth")), ExitCode::FAILURE);
    }

    #[test]
    fn test_missing_values_leave_no_files_behind() {
        let home = tempfile::TempDir::new().unwrap();
        let app_dir = home.path().join(".config").join("gphoto-email");
        let arg = |name: &str| app_dir.join(name).to_string_lossy().into_owned();
        let (state, token, secret) = (arg("state.json"), arg("token.json"), arg("secret.json"));

        let cli = Cli::try_parse_from([
            "gphoto-email",
            "--to",
            "",
            "--album",
            "",
            "--state-file",
            &state,
            "--token-file",
            &token,
            "--client-secret",
            &secret,
        ])
        .unwrap();

        let err = execute(&cli).unwrap_err();
        assert_eq!(exit_code(&err), ExitCode::from(2));
        assert!(!app_dir.exists());
        assert_eq!(std::fs::read_dir(home.path()).unwrap().count(), 0);
    }
}
