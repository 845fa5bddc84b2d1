//! services/reader/src/state.rs
//!
//! Defines the client's application state: the wiring between the sync
//! controller, the session state machine, and the local settings.

use manhua_core::access::{access_decision, can_administer, AccessDecision};
use manhua_core::admin::{self, NewAccount};
use manhua_core::auth::{AuthResult, Authenticator, CredentialForm, Login, SessionState};
use manhua_core::domain::{Account, ApplicationDocument, DeviceId};
use manhua_core::ports::{CredentialHasher, DeviceIdentityProvider, RemoteDocumentStore};
use manhua_core::seed::{SEED_ADMIN_EMAIL, SEED_ADMIN_ID};
use manhua_core::sync::{SyncController, SyncStatus};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ClientError;
use crate::settings::LocalSettings;

//=========================================================================================
// ReaderState (One Per Running Client)
//=========================================================================================

/// The client's state, created once at startup. The UI layer holds it and calls
/// the methods below; it never gets an independent copy of the document.
pub struct ReaderState {
    pub config: Arc<Config>,
    settings: LocalSettings,
    sync: SyncController<Arc<dyn RemoteDocumentStore>>,
    auth: Authenticator,
    hasher: Arc<dyn CredentialHasher>,
    devices: Arc<dyn DeviceIdentityProvider>,
}

impl ReaderState {
    /// Starts from `initial` (the bundled document) and the saved settings.
    /// Nothing is fetched until [`ReaderState::pull`] is called.
    pub fn new(
        config: Arc<Config>,
        settings: LocalSettings,
        store: Arc<dyn RemoteDocumentStore>,
        hasher: Arc<dyn CredentialHasher>,
        devices: Arc<dyn DeviceIdentityProvider>,
        initial: ApplicationDocument,
    ) -> Self {
        let sync = SyncController::new(store, settings.target(), initial)
            .with_token(settings.last_token());
        let auth = Authenticator::new(hasher.clone(), devices.clone());
        Self {
            config,
            settings,
            sync,
            auth,
            hasher,
            devices,
        }
    }

    pub fn document(&self) -> &ApplicationDocument {
        self.sync.document()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn settings(&self) -> &LocalSettings {
        &self.settings
    }

    pub fn session(&self) -> &SessionState {
        self.auth.state()
    }

    pub fn device_id(&self) -> DeviceId {
        self.devices.get_or_create_device_id()
    }

    pub fn current_account(&self) -> Option<&Account> {
        self.auth.current_account(self.sync.document())
    }

    //-------------------------------------------------------------------------------------
    // Session
    //-------------------------------------------------------------------------------------

    /// Only a login that writes a new device binding marks the document dirty.
    pub fn login(&mut self, email: &str, secret: &str) -> AuthResult<Account> {
        let auth = &mut self.auth;
        self.sync.edit(|doc| track_login(auth.login(doc, email, secret)))
    }

    /// The login form the UI fills in before calling [`ReaderState::submit_login`].
    pub fn login_form(&mut self) -> &mut CredentialForm {
        self.auth.form_mut()
    }

    pub fn submit_login(&mut self) -> AuthResult<Account> {
        let auth = &mut self.auth;
        self.sync.edit(|doc| track_login(auth.submit_form(doc)))
    }

    /// Ends the session and clears the login form.
    pub fn logout(&mut self) {
        self.auth.logout();
    }

    //-------------------------------------------------------------------------------------
    // Reading
    //-------------------------------------------------------------------------------------

    /// Decides access to a chapter by id. `None` when either id is unknown.
    pub fn open_chapter(&self, series_id: &str, chapter_id: &str) -> Option<AccessDecision> {
        let series = self.document().find_series(series_id)?;
        let chapter = series.find_chapter(chapter_id)?;
        Some(access_decision(self.current_account(), chapter, series))
    }

    pub fn can_view(&self, series_id: &str, chapter_id: &str) -> bool {
        self.open_chapter(series_id, chapter_id)
            .is_some_and(AccessDecision::is_allowed)
    }

    pub fn toggle_bookmark(&mut self, series_id: &str) -> Result<bool, ClientError> {
        let account_id = self.require_account()?;
        Ok(self
            .sync
            .edit(|doc| track(admin::toggle_bookmark(doc, &account_id, series_id)))?)
    }

    pub fn toggle_favorite(&mut self, series_id: &str) -> Result<bool, ClientError> {
        let account_id = self.require_account()?;
        Ok(self
            .sync
            .edit(|doc| track(admin::toggle_favorite(doc, &account_id, series_id)))?)
    }

    //-------------------------------------------------------------------------------------
    // Administration
    //-------------------------------------------------------------------------------------

    fn require_account(&self) -> Result<String, ClientError> {
        self.current_account()
            .map(|a| a.id.clone())
            .ok_or_else(|| ClientError::Forbidden("sign in first".to_string()))
    }

    fn require_admin(&self) -> Result<Account, ClientError> {
        match self.current_account() {
            Some(account) if can_administer(Some(account)) => Ok(account.clone()),
            _ => Err(ClientError::Forbidden(
                "the admin panel requires an editor or super-admin".to_string(),
            )),
        }
    }

    pub fn register_account(&mut self, new: NewAccount) -> Result<Account, ClientError> {
        let actor = self.require_admin()?;
        let hasher = self.hasher.as_ref();
        Ok(self
            .sync
            .edit(|doc| track(admin::register_account(doc, hasher, &actor, new)))?)
    }

    pub fn release_device(&mut self, account_id: &str) -> Result<(), ClientError> {
        let actor = self.require_admin()?;
        Ok(self
            .sync
            .edit(|doc| track(admin::release_device(doc, &actor, account_id)))?)
    }

    pub fn set_premium(&mut self, account_id: &str, is_premium: bool) -> Result<(), ClientError> {
        let actor = self.require_admin()?;
        Ok(self
            .sync
            .edit(|doc| track(admin::set_premium(doc, &actor, account_id, is_premium)))?)
    }

    //-------------------------------------------------------------------------------------
    // Sync and Settings
    //-------------------------------------------------------------------------------------

    /// Replaces the remote target. Takes effect for the next pull or push; the
    /// file is only written by [`ReaderState::save_settings`].
    pub fn update_settings(&mut self, settings: LocalSettings) {
        self.sync.set_target(settings.target());
        self.settings = LocalSettings {
            sha: self.sync.token().map(|t| t.as_str().to_string()),
            ..settings
        };
    }

    pub fn save_settings(&self) -> Result<(), ClientError> {
        self.settings.save(&self.config.settings_path())?;
        Ok(())
    }

    /// Open to everyone: readers need the catalogue before anyone can sign in.
    pub async fn pull(&mut self) -> Result<(), ClientError> {
        self.sync.sync_pull().await?;
        self.settings.remember_token(self.sync.token());
        Ok(())
    }

    /// Editors and super-admins only, like the rest of the admin panel.
    pub async fn push(&mut self) -> Result<(), ClientError> {
        self.require_admin()?;
        self.sync.sync_push().await?;
        self.settings.remember_token(self.sync.token());
        info!(sha = ?self.settings.sha, "Document pushed");
        Ok(())
    }

    /// Creates the remote file from the bundled document when none exists yet.
    ///
    /// Signs in as the bundled super-admin, releases the binding that sign-in
    /// wrote so the published account can be claimed from any device, pushes
    /// without a token, and signs out again. Refused once a token is held.
    pub async fn bootstrap_remote(&mut self, admin_secret: &str) -> Result<(), ClientError> {
        if self.sync.token().is_some() {
            return Err(ClientError::Forbidden(
                "the remote document already exists; pull it instead".to_string(),
            ));
        }
        warn!(path = %self.settings.path, "Remote document missing, publishing bundled data");

        self.login(SEED_ADMIN_EMAIL, admin_secret)?;
        let published = match self.release_device(SEED_ADMIN_ID) {
            Ok(()) => self.push().await,
            Err(e) => Err(e),
        };
        self.logout();
        published
    }
}

/// Reports a successful admin edit as a change.
fn track<T, E>(result: Result<T, E>) -> (Result<T, E>, bool) {
    let changed = result.is_ok();
    (result, changed)
}

fn track_login(result: AuthResult<Login>) -> (AuthResult<Account>, bool) {
    match result {
        Ok(login) => (Ok(login.account), login.newly_bound),
        Err(e) => (Err(e), false),
    }
}
