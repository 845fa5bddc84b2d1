//! crates/manhua_core/src/access.rs
//!
//! Decides who may read which chapter. Every function here is pure and total.
//!
//! Gating is advisory: it runs in the same trust domain as the content URLs,
//! so it deters casual access only. Real enforcement needs a server that
//! releases gated pages after its own check.

use crate::domain::{Account, Chapter, ContentSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Gated content requested without a signed-in account.
    NotAuthenticated,
    /// Signed in, but neither premium nor an elevated role.
    PremiumRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// True when the series gate or the chapter's own flag is set.
pub fn is_gated(chapter: &Chapter, series: &ContentSeries) -> bool {
    series.is_premium_only || chapter.is_premium
}

pub fn access_decision(
    user: Option<&Account>,
    chapter: &Chapter,
    series: &ContentSeries,
) -> AccessDecision {
    if !is_gated(chapter, series) {
        return AccessDecision::Allowed;
    }
    match user {
        None => AccessDecision::Denied(DenyReason::NotAuthenticated),
        Some(account) if account.is_premium || account.role.is_elevated() => {
            AccessDecision::Allowed
        }
        Some(_) => AccessDecision::Denied(DenyReason::PremiumRequired),
    }
}

/// `None` means an anonymous reader.
pub fn can_view(user: Option<&Account>, chapter: &Chapter, series: &ContentSeries) -> bool {
    access_decision(user, chapter, series).is_allowed()
}

/// Whether the user may open the admin panel (settings, push and pull).
pub fn can_administer(user: Option<&Account>) -> bool {
    user.is_some_and(|account| account.role.is_elevated())
}
