//! crates/manhua_core/src/seed.rs
//!
//! The document a client starts from before its first successful pull. It holds
//! one super-admin, so a remote store with no file yet can be bootstrapped by
//! signing in and pushing.

use chrono::Utc;

use crate::domain::{Account, ApplicationDocument, Chapter, ContentSeries, Role, SeriesStatus};
use crate::ports::{CredentialHasher, HashError};

pub const SEED_ADMIN_ID: &str = "admin-1";
pub const SEED_ADMIN_EMAIL: &str = "admin@kurdmanhua.com";

/// Builds the bundled document. `admin_secret` is hashed with `hasher`; the
/// plain value is never stored.
pub fn initial_document(
    hasher: &dyn CredentialHasher,
    admin_secret: &str,
) -> Result<ApplicationDocument, HashError> {
    let admin = Account {
        id: SEED_ADMIN_ID.to_string(),
        email: SEED_ADMIN_EMAIL.to_string(),
        password_hash: hasher.hash(admin_secret)?,
        role: Role::SuperAdmin,
        device_id: None,
        is_premium: true,
        bookmarks: Vec::new(),
        favorites: Vec::new(),
    };

    let now = Utc::now();
    let page = |n: u32| format!("https://picsum.photos/600/900?random={n}");
    let sample = ContentSeries {
        id: "m1".to_string(),
        title: "Solo Leveling".to_string(),
        cover_url: "https://picsum.photos/300/450".to_string(),
        description: "A door opens onto a world of dragons and magic.".to_string(),
        genres: vec!["Action".to_string(), "Fantasy".to_string()],
        status: SeriesStatus::Completed,
        is_premium_only: false,
        chapters: vec![
            Chapter {
                id: "c1".to_string(),
                number: 1,
                title: "Chapter 1".to_string(),
                pages: (1..=3).map(page).collect(),
                is_premium: false,
                created_at: now,
            },
            Chapter {
                id: "c2".to_string(),
                number: 2,
                title: "Chapter 2".to_string(),
                pages: (4..=5).map(page).collect(),
                is_premium: true,
                created_at: now,
            },
        ],
        views: 120_500,
    };

    Ok(ApplicationDocument {
        accounts: vec![admin],
        series: vec![sample],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::is_gated;
    use crate::testing::PlainHasher;

    #[test]
    fn seed_holds_one_hashed_super_admin() {
        let doc = initial_document(&PlainHasher, "s3cret").unwrap();
        let admin = doc.find_account_by_email(SEED_ADMIN_EMAIL).unwrap();
        assert_eq!(admin.id, SEED_ADMIN_ID);
        assert_eq!(admin.role, Role::SuperAdmin);
        assert!(admin.device_id.is_none());
        assert_ne!(admin.password_hash, "s3cret");
        assert!(PlainHasher.verify("s3cret", &admin.password_hash));
    }

    #[test]
    fn seed_series_has_one_free_and_one_gated_chapter() {
        let doc = initial_document(&PlainHasher, "s3cret").unwrap();
        let series = &doc.series[0];
        let gated: Vec<bool> = series.chapters.iter().map(|c| is_gated(c, series)).collect();
        assert_eq!(gated, [false, true]);
    }
}
