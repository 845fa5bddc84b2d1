//! crates/manhua_core/src/admin.rs
//!
//! Administrative account edits and per-account collections.
//! Like login, these mutate the in-memory document only; a push persists them.

use tracing::info;
use uuid::Uuid;

use crate::domain::{Account, ApplicationDocument, Role};
use crate::ports::{CredentialHasher, HashError};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Not permitted for this role")]
    Forbidden,
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error(transparent)]
    Hash(#[from] HashError),
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Input for [`register_account`]. The secret is hashed before it is stored.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub secret: String,
    pub role: Role,
    pub is_premium: bool,
}

fn require_role(actor: &Account, allowed: &[Role]) -> AdminResult<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(AdminError::Forbidden)
    }
}

/// Adds a new, unbound account. Super-admin only.
pub fn register_account(
    doc: &mut ApplicationDocument,
    hasher: &dyn CredentialHasher,
    actor: &Account,
    new: NewAccount,
) -> AdminResult<Account> {
    require_role(actor, &[Role::SuperAdmin])?;
    if doc.find_account_by_email(&new.email).is_some() {
        return Err(AdminError::EmailTaken(new.email));
    }

    let account = Account {
        id: Uuid::new_v4().to_string(),
        email: new.email,
        password_hash: hasher.hash(&new.secret)?,
        role: new.role,
        device_id: None,
        is_premium: new.is_premium,
        bookmarks: Vec::new(),
        favorites: Vec::new(),
    };
    info!(account_id = %account.id, role = ?account.role, "Registered account");
    doc.accounts.push(account.clone());
    Ok(account)
}

/// Clears a device binding so the account can sign in from a new device.
/// This is the only path that changes an existing binding. Super-admin only.
pub fn release_device(
    doc: &mut ApplicationDocument,
    actor: &Account,
    account_id: &str,
) -> AdminResult<()> {
    require_role(actor, &[Role::SuperAdmin])?;
    let account = doc
        .find_account_mut(account_id)
        .ok_or_else(|| AdminError::AccountNotFound(account_id.to_string()))?;
    if let Some(previous) = account.device_id.take() {
        info!(account_id, device = previous.short(), "Released device binding");
    }
    Ok(())
}

pub fn set_premium(
    doc: &mut ApplicationDocument,
    actor: &Account,
    account_id: &str,
    is_premium: bool,
) -> AdminResult<()> {
    require_role(actor, &[Role::Editor, Role::SuperAdmin])?;
    let account = doc
        .find_account_mut(account_id)
        .ok_or_else(|| AdminError::AccountNotFound(account_id.to_string()))?;
    account.is_premium = is_premium;
    info!(account_id, is_premium, "Updated premium status");
    Ok(())
}

/// Adds `id` if absent, removes it if present. Returns whether it is now present.
fn toggle(set: &mut Vec<String>, id: &str) -> bool {
    match set.iter().position(|x| x == id) {
        Some(idx) => {
            set.remove(idx);
            false
        }
        None => {
            set.push(id.to_string());
            true
        }
    }
}

pub fn toggle_bookmark(
    doc: &mut ApplicationDocument,
    account_id: &str,
    series_id: &str,
) -> AdminResult<bool> {
    let account = doc
        .find_account_mut(account_id)
        .ok_or_else(|| AdminError::AccountNotFound(account_id.to_string()))?;
    Ok(toggle(&mut account.bookmarks, series_id))
}

pub fn toggle_favorite(
    doc: &mut ApplicationDocument,
    account_id: &str,
    series_id: &str,
) -> AdminResult<bool> {
    let account = doc
        .find_account_mut(account_id)
        .ok_or_else(|| AdminError::AccountNotFound(account_id.to_string()))?;
    Ok(toggle(&mut account.favorites, series_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceId;
    use crate::testing::{account, PlainHasher};

    fn document() -> ApplicationDocument {
        let mut reader = account("u1", "reader@example.com", "pw", Role::Standard);
        reader.device_id = Some(DeviceId::new("device-a"));
        ApplicationDocument {
            accounts: vec![
                account("admin-1", "admin@example.com", "admin", Role::SuperAdmin),
                account("ed-1", "editor@example.com", "ed", Role::Editor),
                reader,
            ],
            series: vec![],
        }
    }

    #[test]
    fn register_hashes_secret_and_rejects_duplicates() {
        let mut doc = document();
        let admin = doc.accounts[0].clone();
        let new = NewAccount {
            email: "new@example.com".to_string(),
            secret: "s3cret".to_string(),
            role: Role::Standard,
            is_premium: true,
        };

        let created = register_account(&mut doc, &PlainHasher, &admin, new.clone()).unwrap();
        assert_ne!(created.password_hash, "s3cret");
        assert!(PlainHasher.verify("s3cret", &created.password_hash));
        assert!(created.device_id.is_none());
        assert_eq!(doc.accounts.len(), 4);

        let dup = register_account(&mut doc, &PlainHasher, &admin, new).unwrap_err();
        assert!(matches!(dup, AdminError::EmailTaken(_)));
        assert_eq!(doc.accounts.len(), 4);
    }

    #[test]
    fn only_super_admin_releases_devices() {
        let mut doc = document();
        let editor = doc.accounts[1].clone();
        let admin = doc.accounts[0].clone();

        assert!(matches!(
            release_device(&mut doc, &editor, "u1"),
            Err(AdminError::Forbidden)
        ));
        assert!(doc.accounts[2].device_id.is_some());

        release_device(&mut doc, &admin, "u1").unwrap();
        assert!(doc.accounts[2].device_id.is_none());

        assert!(matches!(
            release_device(&mut doc, &admin, "missing"),
            Err(AdminError::AccountNotFound(_))
        ));
    }

    #[test]
    fn editors_grant_premium_but_readers_cannot() {
        let mut doc = document();
        let editor = doc.accounts[1].clone();
        let reader = doc.accounts[2].clone();

        assert!(matches!(
            set_premium(&mut doc, &reader, "u1", true),
            Err(AdminError::Forbidden)
        ));
        set_premium(&mut doc, &editor, "u1", true).unwrap();
        assert!(doc.accounts[2].is_premium);
    }

    #[test]
    fn collections_behave_as_ordered_sets() {
        let mut doc = document();
        assert!(toggle_bookmark(&mut doc, "u1", "m1").unwrap());
        assert!(toggle_bookmark(&mut doc, "u1", "m2").unwrap());
        assert!(toggle_bookmark(&mut doc, "u1", "m3").unwrap());
        assert!(!toggle_bookmark(&mut doc, "u1", "m2").unwrap());
        assert_eq!(doc.accounts[2].bookmarks, ["m1", "m3"]);

        assert!(toggle_favorite(&mut doc, "u1", "m1").unwrap());
        assert_eq!(doc.accounts[2].favorites, ["m1"]);
        assert!(doc.accounts[2].bookmarks.len() == 2);
    }
}
