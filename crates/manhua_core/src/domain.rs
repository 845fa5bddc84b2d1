//! crates/manhua_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or wire format.

use chrono::{DateTime, Utc};
use std::fmt;

//=========================================================================================
// Identity Newtypes
//=========================================================================================

/// An opaque identifier for the local browsing context / installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first eight characters, used when the id is shown to a user.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The version marker handed out by the remote store on every read and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncToken(String);

impl SyncToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Accounts
//=========================================================================================

/// The closed set of roles an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Standard,
    Editor,
    SuperAdmin,
}

impl Role {
    /// Editors and super-admins see gated content and the sync panel.
    pub fn is_elevated(self) -> bool {
        !matches!(self, Role::Standard)
    }
}

/// One registered identity. The secret is only ever held as a salted hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub device_id: Option<DeviceId>,
    pub is_premium: bool,
    pub bookmarks: Vec<String>,
    pub favorites: Vec<String>,
}

//=========================================================================================
// Content
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStatus {
    Ongoing,
    Completed,
}

/// One readable unit within a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: String,
    pub number: u32,
    pub title: String,
    /// Page image URLs, in reading order.
    pub pages: Vec<String>,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

/// A titled work and its chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSeries {
    pub id: String,
    pub title: String,
    pub cover_url: String,
    pub description: String,
    pub genres: Vec<String>,
    pub status: SeriesStatus,
    /// Gates every chapter regardless of the chapter's own flag.
    pub is_premium_only: bool,
    pub chapters: Vec<Chapter>,
    pub views: u64,
}

impl ContentSeries {
    pub fn find_chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    /// Restores reading order after chapters were appended out of order.
    /// The sort is stable, so chapters sharing a number keep their relative order.
    pub fn sort_chapters(&mut self) {
        self.chapters.sort_by_key(|c| c.number);
    }

    /// Returns the chapters immediately before and after `chapter_id`.
    pub fn neighbours(&self, chapter_id: &str) -> (Option<&Chapter>, Option<&Chapter>) {
        let Some(idx) = self.chapters.iter().position(|c| c.id == chapter_id) else {
            return (None, None);
        };
        let prev = idx.checked_sub(1).and_then(|i| self.chapters.get(i));
        let next = self.chapters.get(idx + 1);
        (prev, next)
    }
}

//=========================================================================================
// The Synchronized Document
//=========================================================================================

/// The entire persisted state. Synchronized as a single unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDocument {
    pub accounts: Vec<Account>,
    pub series: Vec<ContentSeries>,
}

impl ApplicationDocument {
    pub fn find_account(&self, account_id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == account_id)
    }

    pub fn find_account_mut(&mut self, account_id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == account_id)
    }

    /// Exact, case-sensitive match on the login key.
    pub fn find_account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.email == email)
    }

    pub fn find_series(&self, series_id: &str) -> Option<&ContentSeries> {
        self.series.iter().find(|s| s.id == series_id)
    }
}

//=========================================================================================
// Remote Target
//=========================================================================================

/// Addresses the remote file holding the document, plus the bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreTarget {
    pub owner: String,
    pub repository: String,
    pub path: String,
    pub credential: String,
}

impl StoreTarget {
    /// Owner, repository, path and credential must all be non-empty before any sync.
    pub fn is_complete(&self) -> bool {
        !self.owner.is_empty()
            && !self.repository.is_empty()
            && !self.path.is_empty()
            && !self.credential.is_empty()
    }
}

// The credential must never end up in logs.
impl fmt::Debug for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTarget")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("path", &self.path)
            .field("credential", &"<redacted>")
            .finish()
    }
}
