//! services/reader/src/bin/reader.rs
//!
//! Operator entry point: loads configuration and saved settings, pulls the
//! document once, reports what it contains, and saves the new sync token.
//! When the remote file does not exist yet, the bundled document is published.

use manhua_core::access::is_gated;
use manhua_core::ports::SyncError;
use manhua_core::seed::initial_document;
use reader_lib::{
    adapters::{Argon2Hasher, FileDeviceIdentity, GitHubContentsAdapter},
    config::Config,
    error::ClientError,
    settings::LocalSettings,
    state::ReaderState,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(state_dir = %config.state_dir.display(), "Configuration loaded");

    // --- 2. Local State: Settings & Device Identity ---
    let settings = LocalSettings::load(&config.settings_path())?;
    if !settings.target().is_complete() {
        error!(
            path = %config.settings_path().display(),
            "Remote store settings are incomplete; set owner, repository, path and token"
        );
        return Ok(());
    }
    let devices = Arc::new(FileDeviceIdentity::new(config.device_id_path()));

    // --- 3. Initialize Service Adapters ---
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.http_timeout)
        .build()?;
    let store = Arc::new(GitHubContentsAdapter::new(
        client,
        config.github_api_url.clone(),
    ));
    let hasher = Arc::new(Argon2Hasher::new()?);

    // --- 4. Build the State from the Bundled Document & Pull ---
    // Without a configured secret the bundled admin gets one nobody knows.
    let bootstrap_secret = config.bootstrap_secret.clone();
    let seed_secret = bootstrap_secret
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let initial = initial_document(hasher.as_ref(), &seed_secret)?;
    let mut state = ReaderState::new(config.clone(), settings, store, hasher, devices, initial);
    info!(device = state.device_id().short(), "Device identity ready");

    match state.pull().await {
        Ok(()) => {}
        Err(ClientError::Sync(SyncError::NotFound(path))) => match bootstrap_secret {
            Some(secret) => state.bootstrap_remote(&secret).await?,
            None => {
                error!(
                    %path,
                    "Remote document does not exist; set READER_BOOTSTRAP_SECRET to publish the bundled data"
                );
                return Ok(());
            }
        },
        Err(e) => return Err(e),
    }
    let doc = state.document();
    let chapters: usize = doc.series.iter().map(|s| s.chapters.len()).sum();
    let gated: usize = doc
        .series
        .iter()
        .flat_map(|s| s.chapters.iter().map(move |c| is_gated(c, s)))
        .filter(|gated| *gated)
        .count();
    info!(
        accounts = doc.accounts.len(),
        series = doc.series.len(),
        chapters,
        gated,
        "Document ready"
    );

    // --- 5. Persist the New Token ---
    state.save_settings()?;
    Ok(())
}
