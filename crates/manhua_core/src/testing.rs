//! Test doubles shared by the unit tests in this crate.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::{Account, ApplicationDocument, DeviceId, Role, StoreTarget, SyncToken};
use crate::ports::{
    CredentialHasher, DeviceIdentityProvider, HashError, RemoteDocumentStore, SyncError,
    SyncResult,
};

/// Stores secrets with a visible prefix. Only for tests.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, secret: &str) -> Result<String, HashError> {
        Ok(format!("plain${secret}"))
    }

    fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        stored_hash.strip_prefix("plain$") == Some(secret)
    }
}

pub struct FixedDevice(DeviceId);

impl FixedDevice {
    pub fn new(id: &str) -> Self {
        Self(DeviceId::new(id))
    }
}

impl DeviceIdentityProvider for FixedDevice {
    fn get_or_create_device_id(&self) -> DeviceId {
        self.0.clone()
    }
}

pub fn account(id: &str, email: &str, secret: &str, role: Role) -> Account {
    Account {
        id: id.to_string(),
        email: email.to_string(),
        password_hash: format!("plain${secret}"),
        role,
        device_id: None,
        is_premium: false,
        bookmarks: vec![],
        favorites: vec![],
    }
}

pub fn target() -> StoreTarget {
    StoreTarget {
        owner: "owner".to_string(),
        repository: "repo".to_string(),
        path: "db.json".to_string(),
        credential: "token".to_string(),
    }
}

/// A single-file store with an integer version; scripted failures take priority.
#[derive(Default)]
pub struct ScriptedStore {
    pub remote: Mutex<Option<(ApplicationDocument, u64)>>,
    pub fail_next: Mutex<Option<SyncError>>,
}

impl ScriptedStore {
    pub fn with(doc: ApplicationDocument) -> Self {
        Self {
            remote: Mutex::new(Some((doc, 1))),
            fail_next: Mutex::new(None),
        }
    }

    pub fn fail_next(&self, err: SyncError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl RemoteDocumentStore for ScriptedStore {
    async fn pull(&self, _target: &StoreTarget) -> SyncResult<(ApplicationDocument, SyncToken)> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        match &*self.remote.lock().unwrap() {
            Some((doc, version)) => Ok((doc.clone(), SyncToken::new(version.to_string()))),
            None => Err(SyncError::NotFound("db.json".to_string())),
        }
    }

    async fn push(
        &self,
        _target: &StoreTarget,
        document: &ApplicationDocument,
        token: Option<&SyncToken>,
    ) -> SyncResult<SyncToken> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        let mut remote = self.remote.lock().unwrap();
        let current = remote.as_ref().map(|(_, v)| v.to_string());
        if current.as_deref() != token.map(|t| t.as_str()) {
            return Err(SyncError::Conflict("version mismatch".to_string()));
        }
        let next = remote.as_ref().map_or(1, |(_, v)| v + 1);
        *remote = Some((document.clone(), next));
        Ok(SyncToken::new(next.to_string()))
    }
}
