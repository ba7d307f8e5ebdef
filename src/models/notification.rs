use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    NotificationKind {
        Selection => "selection",
        Message => "message",
        Application => "application",
        Interview => "interview",
    }
}

/// Addressed by username rather than user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub job_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: String,
    pub message: String,
    pub kind: NotificationKind,
    pub job_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
}

impl NewNotification {
    pub fn new(recipient: impl Into<String>, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.into(),
            kind,
            job_id: None,
            application_id: None,
        }
    }

    pub fn for_job(mut self, job_id: Uuid) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn for_application(mut self, application_id: Uuid) -> Self {
        self.application_id = Some(application_id);
        self
    }
}
