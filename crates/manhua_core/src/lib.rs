pub mod access;
pub mod admin;
pub mod auth;
pub mod domain;
pub mod ports;
pub mod seed;
pub mod sync;

#[cfg(test)]
mod testing;

pub use access::{access_decision, can_administer, can_view, AccessDecision, DenyReason};
pub use admin::{AdminError, NewAccount};
pub use auth::{AuthError, Authenticator, CredentialForm, Login, SessionState};
pub use domain::{
    Account, ApplicationDocument, Chapter, ContentSeries, DeviceId, Role, SeriesStatus,
    StoreTarget, SyncToken,
};
pub use ports::{
    CredentialHasher, DeviceIdentityProvider, HashError, RemoteDocumentStore, SyncError,
    SyncResult,
};
pub use seed::initial_document;
pub use sync::{SyncController, SyncStatus};
