//! crates/manhua_core/src/sync.rs
//!
//! Owns the in-memory document and the last known sync token, and reconciles
//! them with the remote store on explicit pull and push commands.
//!
//! Both commands take `&mut self`, so a second pull or push cannot start on the
//! same controller while one is awaiting the network. State is only written
//! after the store call has returned successfully.

use tracing::{info, warn};

use crate::domain::{ApplicationDocument, StoreTarget, SyncToken};
use crate::ports::{RemoteDocumentStore, SyncError, SyncResult};

/// Snapshot of the controller's bookkeeping, for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub token: Option<SyncToken>,
    /// True when local edits exist since the last successful pull or push.
    pub is_dirty: bool,
}

pub struct SyncController<S> {
    store: S,
    target: StoreTarget,
    document: ApplicationDocument,
    token: Option<SyncToken>,
    dirty: bool,
}

impl<S: RemoteDocumentStore> SyncController<S> {
    /// Starts from `document` (usually the bundled initial data) with no token.
    pub fn new(store: S, target: StoreTarget, document: ApplicationDocument) -> Self {
        Self {
            store,
            target,
            document,
            token: None,
            dirty: false,
        }
    }

    /// Resumes with a token persisted from an earlier session.
    pub fn with_token(mut self, token: Option<SyncToken>) -> Self {
        self.token = token;
        self
    }

    pub fn document(&self) -> &ApplicationDocument {
        &self.document
    }

    /// Runs `edit` against the document. The document is marked dirty only when
    /// `edit` reports that it changed something.
    pub fn edit<T>(&mut self, edit: impl FnOnce(&mut ApplicationDocument) -> (T, bool)) -> T {
        let (output, changed) = edit(&mut self.document);
        self.dirty |= changed;
        output
    }

    pub fn token(&self) -> Option<&SyncToken> {
        self.token.as_ref()
    }

    pub fn target(&self) -> &StoreTarget {
        &self.target
    }

    /// Points the controller at another file. The held token belongs to the old
    /// file, so it is dropped.
    pub fn set_target(&mut self, target: StoreTarget) {
        if target != self.target {
            self.token = None;
        }
        self.target = target;
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            token: self.token.clone(),
            is_dirty: self.dirty,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn check_target(&self) -> SyncResult<()> {
        if self.target.is_complete() {
            Ok(())
        } else {
            Err(SyncError::Auth(
                "remote store owner, repository, path and credential must be configured"
                    .to_string(),
            ))
        }
    }

    /// Replaces the whole document with the remote copy.
    /// On failure the previous document and token stay in place.
    pub async fn sync_pull(&mut self) -> SyncResult<&ApplicationDocument> {
        self.check_target()?;
        info!(remote = ?self.target, "Pulling document");
        let (document, token) = self.store.pull(&self.target).await.map_err(|e| {
            warn!(error = %e, "Pull failed");
            e
        })?;

        self.document = document;
        self.token = Some(token);
        self.dirty = false;
        info!(
            accounts = self.document.accounts.len(),
            series = self.document.series.len(),
            "Pull complete"
        );
        Ok(&self.document)
    }

    /// Writes the whole document, conditioned on the held token.
    /// A `Conflict` means someone else wrote first; pull, reapply, and push again.
    pub async fn sync_push(&mut self) -> SyncResult<&SyncToken> {
        self.check_target()?;
        info!(remote = ?self.target, has_token = self.token.is_some(), "Pushing document");
        let token = self
            .store
            .push(&self.target, &self.document, self.token.as_ref())
            .await
            .map_err(|e| {
                warn!(error = %e, "Push failed");
                e
            })?;

        self.dirty = false;
        info!(token = %token, "Push complete");
        Ok(&*self.token.insert(token))
    }
}
