//! services/reader/src/settings.rs
//!
//! The user's saved remote-store settings: where the document lives, the access
//! token, and the last sync token seen. Loaded at startup and written only on an
//! explicit save.

use manhua_core::domain::{StoreTarget, SyncToken};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSettings {
    #[serde(default)]
    pub owner: String,
    #[serde(default, alias = "repo")]
    pub repository: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

fn default_path() -> String {
    "db.json".to_string()
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repository: String::new(),
            path: default_path(),
            token: String::new(),
            sha: None,
        }
    }
}

// Keeps the access token out of logs.
impl std::fmt::Debug for LocalSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSettings")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("path", &self.path)
            .field("token", &"<redacted>")
            .field("sha", &self.sha)
            .finish()
    }
}

impl LocalSettings {
    /// Reads the settings file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                debug!(path = %path.display(), "Loaded settings");
                Ok(serde_json::from_str(&raw)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    pub fn target(&self) -> StoreTarget {
        StoreTarget {
            owner: self.owner.clone(),
            repository: self.repository.clone(),
            path: self.path.clone(),
            credential: self.token.clone(),
        }
    }

    pub fn last_token(&self) -> Option<SyncToken> {
        self.sha.clone().map(SyncToken::new)
    }

    /// Records the token from the latest successful pull or push.
    pub fn remember_token(&mut self, token: Option<&SyncToken>) {
        self.sha = token.map(|t| t.as_str().to_string());
    }
}
