use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant};

/// One business photo row as stored in `usaha_foto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub id: Uuid,
    #[serde(rename = "nama_penginput")]
    #[sqlx(rename = "nama_penginput")]
    pub submitter_name: String,
    #[serde(rename = "nama_usaha")]
    #[sqlx(rename = "nama_usaha")]
    pub business_name: String,
    #[serde(rename = "timestamp")]
    #[sqlx(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Accepts only the canonical hyphenated form of a version 1-5, RFC 4122 UUID.
pub fn parse_record_id(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    let id = Uuid::try_parse(raw).ok()?;
    let versioned = matches!(id.get_version_num(), 1..=5);
    (versioned && id.get_variant() == Variant::RFC4122).then_some(id)
}
