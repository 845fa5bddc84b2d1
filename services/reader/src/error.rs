//! services/reader/src/error.rs
//!
//! Defines the primary error type for the reader service.

use crate::config::ConfigError;
use crate::settings::SettingsError;
use manhua_core::admin::AdminError;
use manhua_core::auth::AuthError;
use manhua_core::ports::{HashError, SyncError};

/// The primary error type for the `reader` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Represents an error that propagated up from the remote document store.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Login failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Account administration failed: {0}")]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Hash(#[from] HashError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The signed-in account may not perform this action.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
