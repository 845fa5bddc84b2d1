//! services/reader/src/adapters/wire.rs
//!
//! The on-disk shape of the document and its transport encoding.
//!
//! The remote file is pretty-printed UTF-8 JSON, base64-encoded as the contents
//! API requires. Domain types stay serialization-free; the `*Record` structs in
//! this module carry the serde mapping and convert with `to_domain` / `from_domain`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use manhua_core::domain::{
    Account, ApplicationDocument, Chapter, ContentSeries, DeviceId, Role, SeriesStatus,
};
use manhua_core::ports::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default)]
    accounts: Vec<AccountRecord>,
    #[serde(default)]
    series: Vec<SeriesRecord>,
}

impl DocumentRecord {
    pub fn from_domain(doc: &ApplicationDocument) -> Self {
        Self {
            accounts: doc.accounts.iter().map(AccountRecord::from_domain).collect(),
            series: doc.series.iter().map(SeriesRecord::from_domain).collect(),
        }
    }

    pub fn to_domain(self) -> ApplicationDocument {
        ApplicationDocument {
            accounts: self.accounts.into_iter().map(AccountRecord::to_domain).collect(),
            series: self.series.into_iter().map(SeriesRecord::to_domain).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RoleRecord {
    User,
    Editor,
    SuperAdmin,
}

impl From<Role> for RoleRecord {
    fn from(role: Role) -> Self {
        match role {
            Role::Standard => RoleRecord::User,
            Role::Editor => RoleRecord::Editor,
            Role::SuperAdmin => RoleRecord::SuperAdmin,
        }
    }
}

impl From<RoleRecord> for Role {
    fn from(role: RoleRecord) -> Self {
        match role {
            RoleRecord::User => Role::Standard,
            RoleRecord::Editor => Role::Editor,
            RoleRecord::SuperAdmin => Role::SuperAdmin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    id: String,
    email: String,
    password_hash: String,
    role: RoleRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
    #[serde(default)]
    is_premium: bool,
    #[serde(default)]
    bookmarks: Vec<String>,
    #[serde(default)]
    favorites: Vec<String>,
}

impl AccountRecord {
    fn from_domain(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            role: account.role.into(),
            device_id: account.device_id.as_ref().map(|d| d.as_str().to_string()),
            is_premium: account.is_premium,
            bookmarks: account.bookmarks.clone(),
            favorites: account.favorites.clone(),
        }
    }

    fn to_domain(self) -> Account {
        Account {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role.into(),
            device_id: self.device_id.map(DeviceId::new),
            is_premium: self.is_premium,
            bookmarks: self.bookmarks,
            favorites: self.favorites,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StatusRecord {
    Ongoing,
    Completed,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesRecord {
    id: String,
    title: String,
    #[serde(default)]
    cover_url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    genre: Vec<String>,
    status: StatusRecord,
    #[serde(default)]
    is_premium_only: bool,
    #[serde(default)]
    chapters: Vec<ChapterRecord>,
    #[serde(default)]
    views: u64,
}

impl SeriesRecord {
    fn from_domain(series: &ContentSeries) -> Self {
        Self {
            id: series.id.clone(),
            title: series.title.clone(),
            cover_url: series.cover_url.clone(),
            description: series.description.clone(),
            genre: series.genres.clone(),
            status: match series.status {
                SeriesStatus::Ongoing => StatusRecord::Ongoing,
                SeriesStatus::Completed => StatusRecord::Completed,
            },
            is_premium_only: series.is_premium_only,
            chapters: series.chapters.iter().map(ChapterRecord::from_domain).collect(),
            views: series.views,
        }
    }

    fn to_domain(self) -> ContentSeries {
        ContentSeries {
            id: self.id,
            title: self.title,
            cover_url: self.cover_url,
            description: self.description,
            genres: self.genre,
            status: match self.status {
                StatusRecord::Ongoing => SeriesStatus::Ongoing,
                StatusRecord::Completed => SeriesStatus::Completed,
            },
            is_premium_only: self.is_premium_only,
            chapters: self.chapters.into_iter().map(ChapterRecord::to_domain).collect(),
            views: self.views,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterRecord {
    id: String,
    number: u32,
    title: String,
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    is_premium: bool,
    created_at: DateTime<Utc>,
}

impl ChapterRecord {
    fn from_domain(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id.clone(),
            number: chapter.number,
            title: chapter.title.clone(),
            pages: chapter.pages.clone(),
            is_premium: chapter.is_premium,
            created_at: chapter.created_at,
        }
    }

    fn to_domain(self) -> Chapter {
        Chapter {
            id: self.id,
            number: self.number,
            title: self.title,
            pages: self.pages,
            is_premium: self.is_premium,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Encoding
//=========================================================================================

/// Pretty-printed JSON, as stored in the repository.
pub fn to_json(doc: &ApplicationDocument) -> SyncResult<String> {
    serde_json::to_string_pretty(&DocumentRecord::from_domain(doc))
        .map_err(|e| SyncError::Decode(format!("failed to serialize document: {e}")))
}

pub fn from_json(json: &str) -> SyncResult<ApplicationDocument> {
    serde_json::from_str::<DocumentRecord>(json)
        .map(DocumentRecord::to_domain)
        .map_err(|e| SyncError::Decode(e.to_string()))
}

/// JSON, then base64 with the standard alphabet.
pub fn encode_document(doc: &ApplicationDocument) -> SyncResult<String> {
    Ok(STANDARD.encode(to_json(doc)?))
}

/// Inverse of [`encode_document`]. Line breaks inside the base64 payload are
/// ignored; the contents API wraps its output at 60 columns.
pub fn decode_document(content: &str) -> SyncResult<ApplicationDocument> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| SyncError::Decode(format!("invalid base64: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| SyncError::Decode(format!("invalid UTF-8: {e}")))?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ApplicationDocument {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ApplicationDocument {
            accounts: vec![Account {
                id: "admin-1".to_string(),
                email: "admin@kurdmanhua.com".to_string(),
                password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
                role: Role::SuperAdmin,
                device_id: Some(DeviceId::new("k3j2h1lmn0p")),
                is_premium: true,
                bookmarks: vec!["m1".to_string()],
                favorites: vec![],
            }],
            series: vec![ContentSeries {
                id: "m1".to_string(),
                title: "سۆلۆ لێڤڵینگ".to_string(),
                cover_url: "https://picsum.photos/300/450".to_string(),
                description: "دەرگایەک دەکرێتەوە".to_string(),
                genres: vec!["Action".to_string(), "Fantasy".to_string()],
                status: SeriesStatus::Completed,
                is_premium_only: false,
                views: 120_500,
                chapters: vec![
                    Chapter {
                        id: "c1".to_string(),
                        number: 1,
                        title: "بەشی یەکەم".to_string(),
                        pages: vec![
                            "https://picsum.photos/600/900?random=1".to_string(),
                            "https://picsum.photos/600/900?random=2".to_string(),
                        ],
                        is_premium: false,
                        created_at: created,
                    },
                    Chapter {
                        id: "c2".to_string(),
                        number: 2,
                        title: "بەشی دووەم".to_string(),
                        pages: vec!["https://picsum.photos/600/900?random=4".to_string()],
                        is_premium: true,
                        created_at: created,
                    },
                ],
            }],
        }
    }

    #[test]
    fn document_survives_transport_encoding() {
        let doc = sample();
        let encoded = encode_document(&doc).unwrap();
        assert_eq!(decode_document(&encoded).unwrap(), doc);
    }

    #[test]
    fn wire_field_names_match_stored_format() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let account = &value["accounts"][0];
        assert_eq!(account["role"], "super_admin");
        assert_eq!(account["deviceId"], "k3j2h1lmn0p");
        assert_eq!(account["isPremium"], true);

        let series = &value["series"][0];
        assert_eq!(series["isPremiumOnly"], false);
        assert_eq!(series["status"], "completed");
        assert_eq!(series["chapters"][1]["isPremium"], true);
        assert!(json.contains('\n'), "stored JSON is pretty-printed");
    }

    #[test]
    fn unbound_device_is_omitted_and_defaults_apply() {
        let json = r#"{
            "accounts": [{"id": "u1", "email": "a@b.c", "passwordHash": "h", "role": "user"}],
            "series": []
        }"#;
        let doc = from_json(json).unwrap();
        let account = &doc.accounts[0];
        assert_eq!(account.role, Role::Standard);
        assert!(account.device_id.is_none());
        assert!(!account.is_premium);

        let back = to_json(&doc).unwrap();
        assert!(!back.contains("deviceId"));
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let encoded = encode_document(&sample()).unwrap();
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(decode_document(&wrapped).unwrap(), sample());
    }

    #[test]
    fn malformed_payloads_are_decode_errors() {
        assert!(matches!(decode_document("%%%"), Err(SyncError::Decode(_))));

        let not_json = STANDARD.encode("hello");
        assert!(matches!(decode_document(&not_json), Err(SyncError::Decode(_))));

        let wrong_shape = STANDARD.encode(r#"{"accounts": [{"id": 3}]}"#);
        assert!(matches!(decode_document(&wrong_shape), Err(SyncError::Decode(_))));

        let unknown_role = STANDARD.encode(
            r#"{"accounts": [{"id": "u", "email": "e", "passwordHash": "h", "role": "owner"}]}"#,
        );
        assert!(matches!(decode_document(&unknown_role), Err(SyncError::Decode(_))));
    }
}
