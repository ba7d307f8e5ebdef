use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// `pending` is read as `applied`; older records used both spellings.
    ApplicationStatus {
        Applied => "applied" | "pending",
        Reviewed => "reviewed",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub contact_no: Option<String>,
    pub email: Option<String>,
    pub resume_path: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Applicant details captured at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetails {
    pub applicant_name: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub contact_no: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub details: ApplicantDetails,
    pub resume_path: Option<String>,
}
