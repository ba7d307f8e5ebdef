use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    InterviewKind {
        Video => "video",
        Phone => "phone",
        InPerson => "in-person",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: Uuid,
    pub job_id: Uuid,
    pub application_id: Uuid,
    pub interviewer: String,
    pub applicant: String,
    pub job_title: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: InterviewKind,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub job_id: Uuid,
    pub application_id: Uuid,
    pub interviewer: String,
    pub applicant: String,
    pub job_title: String,
    pub date: NaiveDate,
    pub time: String,
    pub kind: InterviewKind,
    pub link: Option<String>,
}
