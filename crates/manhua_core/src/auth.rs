//! crates/manhua_core/src/auth.rs
//!
//! Login, logout, and single-device binding.
//!
//! A successful first login binds the current device id to the account inside
//! the in-memory document only. The binding reaches the remote store with the
//! next explicit push; if no push happens, it is lost with the session.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{Account, ApplicationDocument};
use crate::ports::{CredentialHasher, DeviceIdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown email and wrong secret are deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account is bound to another device. Contact an administrator.")]
    DeviceMismatch,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// A successful login. `newly_bound` is true only when this login wrote the
/// device binding into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub account: Account,
    pub newly_bound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated { account_id: String },
}

/// Values typed into the login form but not yet submitted.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct CredentialForm {
    pub email: String,
    pub secret: String,
}

impl CredentialForm {
    pub fn clear(&mut self) {
        self.email.clear();
        self.secret.clear();
    }
}

impl std::fmt::Debug for CredentialForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialForm")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// The session state machine. Holds no copy of the document; every transition
/// borrows the one owned by the sync controller.
pub struct Authenticator {
    hasher: Arc<dyn CredentialHasher>,
    devices: Arc<dyn DeviceIdentityProvider>,
    state: SessionState,
    form: CredentialForm,
}

impl Authenticator {
    pub fn new(hasher: Arc<dyn CredentialHasher>, devices: Arc<dyn DeviceIdentityProvider>) -> Self {
        Self {
            hasher,
            devices,
            state: SessionState::Anonymous,
            form: CredentialForm::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn form_mut(&mut self) -> &mut CredentialForm {
        &mut self.form
    }

    /// The signed-in account, if it still exists in `doc`.
    /// A pull may replace the document and drop the account; that reads as anonymous.
    pub fn current_account<'d>(&self, doc: &'d ApplicationDocument) -> Option<&'d Account> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::Authenticated { account_id } => doc.find_account(account_id),
        }
    }

    /// Validates the credentials and enforces the device binding.
    ///
    /// Failures leave both `doc` and the session state untouched.
    pub fn login(
        &mut self,
        doc: &mut ApplicationDocument,
        email: &str,
        secret: &str,
    ) -> AuthResult<Login> {
        let Some(idx) = doc.accounts.iter().position(|a| a.email == email) else {
            self.hasher.verify_dummy(secret);
            debug!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(secret, &doc.accounts[idx].password_hash) {
            debug!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let device = self.devices.get_or_create_device_id();
        let account = &mut doc.accounts[idx];
        let newly_bound = match &account.device_id {
            Some(bound) if *bound != device => {
                warn!(account_id = %account.id, "Login rejected: account bound to another device");
                return Err(AuthError::DeviceMismatch);
            }
            Some(_) => false,
            None => {
                info!(account_id = %account.id, device = device.short(), "Binding account to device");
                account.device_id = Some(device);
                true
            }
        };

        self.state = SessionState::Authenticated {
            account_id: account.id.clone(),
        };
        info!(account_id = %account.id, "Login succeeded");
        Ok(Login {
            account: account.clone(),
            newly_bound,
        })
    }

    /// Submits the values held in the credential form.
    pub fn submit_form(&mut self, doc: &mut ApplicationDocument) -> AuthResult<Login> {
        let CredentialForm { email, secret } = self.form.clone();
        self.login(doc, &email, &secret)
    }

    /// Always succeeds. Clears the form; the document is not touched.
    pub fn logout(&mut self) -> &SessionState {
        self.form.clear();
        self.state = SessionState::Anonymous;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::testing::{account, FixedDevice, PlainHasher};

    fn authenticator(device: &str) -> Authenticator {
        Authenticator::new(Arc::new(PlainHasher), Arc::new(FixedDevice::new(device)))
    }

    fn document() -> ApplicationDocument {
        ApplicationDocument {
            accounts: vec![account("u1", "reader@example.com", "hunter2", Role::Standard)],
            series: vec![],
        }
    }

    #[test]
    fn first_login_binds_device_and_second_device_is_rejected() {
        let mut doc = document();

        let mut phone = authenticator("device-a");
        let logged_in = phone.login(&mut doc, "reader@example.com", "hunter2").unwrap();
        assert!(logged_in.newly_bound);
        assert_eq!(
            logged_in.account.device_id.as_ref().map(|d| d.as_str()),
            Some("device-a")
        );
        assert_eq!(
            doc.accounts[0].device_id.as_ref().map(|d| d.as_str()),
            Some("device-a")
        );

        let before = doc.clone();
        let mut laptop = authenticator("device-b");
        let err = laptop.login(&mut doc, "reader@example.com", "hunter2").unwrap_err();
        assert_eq!(err, AuthError::DeviceMismatch);
        assert_eq!(doc, before);
        assert_eq!(laptop.state(), &SessionState::Anonymous);
    }

    #[test]
    fn relogin_on_bound_device_is_idempotent() {
        let mut doc = document();
        let mut auth = authenticator("device-a");
        for attempt in 0..3 {
            let login = auth.login(&mut doc, "reader@example.com", "hunter2").unwrap();
            assert_eq!(login.newly_bound, attempt == 0);
            auth.logout();
        }
        assert_eq!(
            doc.accounts[0].device_id.as_ref().map(|d| d.as_str()),
            Some("device-a")
        );
    }

    #[test]
    fn wrong_secret_and_unknown_email_are_indistinguishable() {
        let mut doc = document();
        let mut auth = authenticator("device-a");

        let wrong_secret = auth.login(&mut doc, "reader@example.com", "nope").unwrap_err();
        let unknown_email = auth.login(&mut doc, "ghost@example.com", "hunter2").unwrap_err();

        assert_eq!(wrong_secret, unknown_email);
        assert_eq!(wrong_secret.to_string(), unknown_email.to_string());
        assert!(doc.accounts[0].device_id.is_none());
    }

    #[test]
    fn email_match_is_exact() {
        let mut doc = document();
        let mut auth = authenticator("device-a");
        assert_eq!(
            auth.login(&mut doc, "Reader@Example.com", "hunter2").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn logout_clears_form_but_keeps_document() {
        let mut doc = document();
        let mut auth = authenticator("device-a");
        auth.form_mut().email = "reader@example.com".to_string();
        auth.form_mut().secret = "hunter2".to_string();

        auth.submit_form(&mut doc).unwrap();
        assert!(auth.current_account(&doc).is_some());

        assert_eq!(auth.logout(), &SessionState::Anonymous);
        assert!(auth.form_mut().email.is_empty());
        assert!(auth.form_mut().secret.is_empty());
        assert!(auth.current_account(&doc).is_none());
        assert!(doc.accounts[0].device_id.is_some());
    }

    #[test]
    fn session_reads_anonymous_when_account_disappears() {
        let mut doc = document();
        let mut auth = authenticator("device-a");
        auth.login(&mut doc, "reader@example.com", "hunter2").unwrap();

        let replaced = ApplicationDocument::default();
        assert!(auth.current_account(&replaced).is_none());
    }
}
