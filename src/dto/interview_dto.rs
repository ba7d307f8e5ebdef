use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewKind};
use crate::services::interview_service::ScheduleInterview;
use crate::utils::time::parse_date;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewPayload {
    pub application_id: Uuid,
    #[validate(length(min = 1))]
    pub interviewer: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[validate(length(min = 1))]
    pub date: String,
    #[validate(length(min = 1))]
    pub time: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: InterviewKind,
    pub link: Option<String>,
}

fn default_kind() -> InterviewKind {
    InterviewKind::Video
}

impl TryFrom<ScheduleInterviewPayload> for ScheduleInterview {
    type Error = Error;

    fn try_from(payload: ScheduleInterviewPayload) -> Result<Self> {
        let date = parse_date(&payload.date)
            .map_err(|e| Error::BadRequest(format!("Invalid date: {}", e)))?;
        Ok(ScheduleInterview {
            application_id: payload.application_id,
            interviewer: payload.interviewer,
            date,
            time: payload.time,
            kind: payload.kind,
            link: payload.link,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewScheduled {
    pub message: String,
    pub interview: Interview,
}
