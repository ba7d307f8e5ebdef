use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{non_blank, split_csv, string_list};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobFilter, JobType, WorkMode};
use crate::utils::time::parse_date;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    /// Username of the posting provider.
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[serde(default)]
    pub require_resume: bool,
    pub job_type: Option<JobType>,
    pub work_mode: Option<WorkMode>,
    pub category: Option<String>,
    #[validate(range(min = 1))]
    pub duration_weeks: Option<i32>,
    pub stipend_min: Option<Decimal>,
    pub stipend_max: Option<Decimal>,
    #[validate(range(min = 1))]
    pub openings: Option<i32>,
    #[serde(default, deserialize_with = "string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub perks: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub apply_by: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobCreatedResponse {
    pub message: String,
    pub job: Job,
}

/// Query string of `GET /api/all-jobs`. List parameters are comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchQuery {
    pub q: Option<String>,
    pub job_type: Option<String>,
    pub work_mode: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub remote_only: Option<bool>,
    pub min_stipend: Option<Decimal>,
    pub duration_max: Option<i32>,
    pub start_from: Option<String>,
    pub skills: Option<String>,
    pub perks: Option<String>,
}

impl JobSearchQuery {
    pub fn into_filter(self) -> Result<JobFilter> {
        let job_type = non_blank(self.job_type)
            .map(|s| s.parse::<JobType>())
            .transpose()
            .map_err(|e| Error::BadRequest(e.to_string()))?;
        let mut work_mode = non_blank(self.work_mode)
            .map(|s| s.parse::<WorkMode>())
            .transpose()
            .map_err(|e| Error::BadRequest(e.to_string()))?;
        if self.remote_only == Some(true) {
            work_mode = Some(WorkMode::Remote);
        }
        let start_from = non_blank(self.start_from)
            .map(|s| parse_date(&s))
            .transpose()
            .map_err(|e| Error::BadRequest(format!("Invalid startFrom: {}", e)))?;

        Ok(JobFilter {
            text: non_blank(self.q),
            job_type,
            work_mode,
            category: non_blank(self.category),
            location: non_blank(self.location),
            min_stipend: self.min_stipend,
            duration_max: self.duration_max,
            start_from,
            skills: self.skills.as_deref().map(split_csv).unwrap_or_default(),
            perks: self.perks.as_deref().map(split_csv).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderJobsQuery {
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedJob {
    #[serde(flatten)]
    pub job: Job,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveJobPayload {
    #[validate(length(min = 1))]
    pub username: String,
    pub job_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_accepts_csv_or_array_lists() {
        let base = json!({
            "username": "bob", "title": "t", "description": "d",
            "company": "c", "location": "l",
            "skills": "rust, sql ,,",
            "perks": ["Certificate", " Flexible hours "],
            "jobType": "internship"
        });
        let payload: CreateJobPayload = serde_json::from_value(base).unwrap();
        assert_eq!(payload.skills, ["rust", "sql"]);
        assert_eq!(payload.perks, ["Certificate", "Flexible hours"]);
        assert_eq!(payload.job_type, Some(JobType::Internship));
        assert!(!payload.require_resume);
    }

    #[test]
    fn remote_only_overrides_work_mode() {
        let query = JobSearchQuery {
            work_mode: Some("onsite".into()),
            remote_only: Some(true),
            skills: Some("rust,go".into()),
            job_type: Some(String::new()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.work_mode, Some(WorkMode::Remote));
        assert_eq!(filter.job_type, None);
        assert_eq!(filter.skills, ["rust", "go"]);
    }

    #[test]
    fn unknown_job_type_is_bad_request() {
        let query = JobSearchQuery {
            job_type: Some("gig".into()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(Error::BadRequest(_))));
    }
}
