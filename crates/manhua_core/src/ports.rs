//! crates/manhua_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the remote file API, local storage, and the hashing scheme.

use async_trait::async_trait;
use std::sync::Arc;
use crate::domain::{ApplicationDocument, DeviceId, StoreTarget, SyncToken};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Failures of the remote document store.
/// Every variant is recoverable: fix the configuration, re-pull, or retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The remote store rejected the bearer credential.
    #[error("Remote store rejected the credential: {0}")]
    Auth(String),
    #[error("Remote document not found: {0}")]
    NotFound(String),
    /// The payload is not a document of the expected shape.
    #[error("Could not decode remote document: {0}")]
    Decode(String),
    /// The remote version no longer matches the token we hold.
    #[error("Remote document changed since last pull: {0}")]
    Conflict(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A convenience type alias for `Result<T, SyncError>`.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, thiserror::Error)]
#[error("Failed to hash secret: {0}")]
pub struct HashError(pub String);

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Whole-file read and conditional write against a remote content API.
#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Fetches and decodes the document together with its current version.
    async fn pull(&self, target: &StoreTarget) -> SyncResult<(ApplicationDocument, SyncToken)>;

    /// Writes the whole document.
    ///
    /// With a token, the write must fail with [`SyncError::Conflict`] when the remote
    /// version differs. Without one, the write creates a file that has no prior version.
    async fn push(
        &self,
        target: &StoreTarget,
        document: &ApplicationDocument,
        token: Option<&SyncToken>,
    ) -> SyncResult<SyncToken>;
}

#[async_trait]
impl<T: RemoteDocumentStore + ?Sized> RemoteDocumentStore for Arc<T> {
    async fn pull(&self, target: &StoreTarget) -> SyncResult<(ApplicationDocument, SyncToken)> {
        (**self).pull(target).await
    }

    async fn push(
        &self,
        target: &StoreTarget,
        document: &ApplicationDocument,
        token: Option<&SyncToken>,
    ) -> SyncResult<SyncToken> {
        (**self).push(target, document, token).await
    }
}

/// Produces a stable identifier for the local installation. Never fails.
pub trait DeviceIdentityProvider: Send + Sync {
    fn get_or_create_device_id(&self) -> DeviceId;
}

/// One-way salted hashing of account secrets.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<String, HashError>;

    /// Constant-time verification of `secret` against a stored hash.
    /// An unparseable hash verifies as `false`.
    fn verify(&self, secret: &str, stored_hash: &str) -> bool;

    /// Burns the same work as a real verification. Called for unknown logins so
    /// that response time does not reveal whether an email is registered.
    fn verify_dummy(&self, _secret: &str) {}
}
