use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Placeholder identity for punches recorded without an RFID.
pub const UNKNOWN_IDENTITY: &str = "Unknown";

/// How a punch reached the store. Face and QR clients resolve the worker's
/// RFID themselves and submit it like a tag scan.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PunchSource {
    #[default]
    Rfid,
    Qr,
    Face,
}

impl PunchSource {
    /// Lenient parse for stored values; anything unrecognised is treated as a tag scan.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

/// A single clock-in or clock-out scan event as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "subdomain": "acme",
        "identity": "E1",
        "occurred_at": "2024-01-10T09:00:00Z",
        "local_time": "09:00:00 AM",
        "presence": true,
        "missed_out_hint": false,
        "source": "rfid",
        "name": "Jane Doe",
        "department_name": "Assembly",
        "photo": null
    })
)]
pub struct PunchRecord {
    pub id: u64,
    pub subdomain: String,

    /// RFID/tag value; may be absent for legacy rows.
    #[schema(example = "E1", nullable = true)]
    pub identity: Option<String>,

    /// Server-side creation time. Drives ordering and day bucketing.
    #[schema(value_type = String, format = "date-time")]
    pub occurred_at: DateTime<Utc>,

    /// 12-hour clock string as displayed where the punch happened.
    #[schema(example = "09:00:00 AM")]
    pub local_time: String,

    /// true = punch in, false = punch out.
    pub presence: bool,

    pub missed_out_hint: bool,
    pub source: PunchSource,

    pub name: Option<String>,
    pub department_name: Option<String>,
    pub photo: Option<String>,
}

impl PunchRecord {
    /// Identity used for grouping; empty or absent tags collapse to `"Unknown"`.
    pub fn identity_key(&self) -> &str {
        match self.identity.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => UNKNOWN_IDENTITY,
        }
    }
}

/// Row shape of the `attendance` table.
#[derive(Debug, sqlx::FromRow)]
pub struct PunchRow {
    pub id: u64,
    pub subdomain: String,
    pub rfid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub local_time: String,
    pub presence: bool,
    pub is_missed_out_punch: bool,
    pub source: String,
    pub name: Option<String>,
    pub department_name: Option<String>,
    pub photo: Option<String>,
}

impl From<PunchRow> for PunchRecord {
    fn from(row: PunchRow) -> Self {
        Self {
            id: row.id,
            subdomain: row.subdomain,
            identity: row.rfid,
            occurred_at: row.created_at,
            local_time: row.local_time,
            presence: row.presence,
            missed_out_hint: row.is_missed_out_punch,
            source: PunchSource::from_stored(&row.source),
            name: row.name,
            department_name: row.department_name,
            photo: row.photo,
        }
    }
}
