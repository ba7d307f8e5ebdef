use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Unique per ordered (blocker, blocked) pair. Either direction suppresses
/// delivery between the two users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    pub blocker: String,
    pub blocked: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub reporter: String,
    pub target: String,
    pub reason: String,
    pub chat_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub reporter: String,
    pub target: String,
    pub reason: String,
    pub chat_id: Option<Uuid>,
}
