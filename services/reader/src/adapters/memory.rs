//! services/reader/src/adapters/memory.rs
//!
//! An in-process `RemoteDocumentStore` with the same conditional-write rules as
//! the contents API. Files are held in their transport encoding so that every
//! read goes through the wire codec, as it would against the real service.

use async_trait::async_trait;
use manhua_core::domain::{ApplicationDocument, StoreTarget, SyncToken};
use manhua_core::ports::{RemoteDocumentStore, SyncError, SyncResult};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::adapters::wire::{decode_document, encode_document};

type FileKey = (String, String, String);

struct StoredFile {
    content: String,
    version: u64,
}

impl StoredFile {
    fn token(&self) -> SyncToken {
        SyncToken::new(format!("v{}", self.version))
    }
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    files: Mutex<HashMap<FileKey, StoredFile>>,
    credential: Option<String>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every request whose credential differs from `credential`.
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            files: Mutex::default(),
            credential: Some(credential.into()),
        }
    }

    fn key(target: &StoreTarget) -> FileKey {
        (
            target.owner.clone(),
            target.repository.clone(),
            target.path.clone(),
        )
    }

    fn authorize(&self, target: &StoreTarget) -> SyncResult<()> {
        match &self.credential {
            Some(expected) if *expected != target.credential => {
                Err(SyncError::Auth("Bad credentials".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn lock(&self) -> SyncResult<std::sync::MutexGuard<'_, HashMap<FileKey, StoredFile>>> {
        self.files
            .lock()
            .map_err(|_| SyncError::Transport("store lock poisoned".to_string()))
    }

    /// The raw encoded content and current token of a file, if present.
    pub fn raw(&self, target: &StoreTarget) -> Option<(String, SyncToken)> {
        let files = self.files.lock().ok()?;
        files
            .get(&Self::key(target))
            .map(|f| (f.content.clone(), f.token()))
    }

    /// Writes raw content directly, bypassing encoding and token checks.
    pub fn put_raw(&self, target: &StoreTarget, content: impl Into<String>) -> SyncToken {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let key = Self::key(target);
        let version = files.get(&key).map_or(1, |f| f.version + 1);
        let file = StoredFile {
            content: content.into(),
            version,
        };
        let token = file.token();
        files.insert(key, file);
        token
    }
}

#[async_trait]
impl RemoteDocumentStore for InMemoryDocumentStore {
    async fn pull(&self, target: &StoreTarget) -> SyncResult<(ApplicationDocument, SyncToken)> {
        self.authorize(target)?;
        let files = self.lock()?;
        let file = files
            .get(&Self::key(target))
            .ok_or_else(|| SyncError::NotFound(target.path.clone()))?;
        Ok((decode_document(&file.content)?, file.token()))
    }

    async fn push(
        &self,
        target: &StoreTarget,
        document: &ApplicationDocument,
        token: Option<&SyncToken>,
    ) -> SyncResult<SyncToken> {
        self.authorize(target)?;
        let content = encode_document(document)?;
        let mut files = self.lock()?;
        let key = Self::key(target);

        let version = match (files.get(&key), token) {
            (None, None) => 1,
            (Some(file), Some(token)) if file.token() == *token => file.version + 1,
            (Some(file), _) => {
                return Err(SyncError::Conflict(format!(
                    "{} is at {}, write was based on {}",
                    target.path,
                    file.token(),
                    token.map_or("nothing", |t| t.as_str())
                )))
            }
            (None, Some(token)) => {
                return Err(SyncError::Conflict(format!(
                    "{} does not exist, write was based on {token}",
                    target.path
                )))
            }
        };

        let file = StoredFile { content, version };
        let new_token = file.token();
        files.insert(key, file);
        Ok(new_token)
    }
}
