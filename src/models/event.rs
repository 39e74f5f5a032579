use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::authz::UserId;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: i64,
    pub contract: i64,
    /// Support-team member in charge of the event
    pub support_contact: Option<UserId>,
    pub attendees: i64,
    pub date: DateTime<Utc>,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbEvent {
    pub id: i64,
    pub contract_id: i64,
    pub support_contact_id: Option<UserId>,
    pub attendees: i64,
    pub date: DateTime<Utc>,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbEvent> for Event {
    fn from(db: DbEvent) -> Self {
        Event {
            id: db.id,
            contract: db.contract_id,
            support_contact: db.support_contact_id,
            attendees: db.attendees,
            date: db.date,
            note: db.note,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventCreateRequest {
    pub contract: i64,
    pub support_contact: UserId,
    #[schema(example = 120)]
    pub attendees: i64,
    #[schema(example = "2025-06-21T18:00:00Z")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventUpdateRequest {
    pub contract: Option<i64>,
    pub support_contact: Option<UserId>,
    pub attendees: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}
