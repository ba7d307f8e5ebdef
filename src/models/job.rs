use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    JobType {
        Job => "job",
        Internship => "internship",
    }
}

text_enum! {
    WorkMode {
        Onsite => "onsite",
        Remote => "remote",
        Hybrid => "hybrid",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub posted_by: Uuid,
    pub require_resume: bool,
    #[sqlx(try_from = "String")]
    pub job_type: JobType,
    #[sqlx(try_from = "String")]
    pub work_mode: WorkMode,
    pub category: Option<String>,
    pub duration_weeks: Option<i32>,
    pub stipend_min: Option<Decimal>,
    pub stipend_max: Option<Decimal>,
    pub openings: Option<i32>,
    pub skills: Vec<String>,
    pub perks: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub apply_by: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub posted_by: Uuid,
    pub require_resume: bool,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    pub category: Option<String>,
    pub duration_weeks: Option<i32>,
    pub stipend_min: Option<Decimal>,
    pub stipend_max: Option<Decimal>,
    pub openings: Option<i32>,
    pub skills: Vec<String>,
    pub perks: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub apply_by: Option<NaiveDate>,
}

/// Seeker-side search criteria. Every populated field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub text: Option<String>,
    pub job_type: Option<JobType>,
    pub work_mode: Option<WorkMode>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_stipend: Option<Decimal>,
    pub duration_max: Option<i32>,
    pub start_from: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub perks: Vec<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(text) = &self.text {
            if !contains_ci(&job.title, text) {
                return false;
            }
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(work_mode) = self.work_mode {
            if job.work_mode != work_mode {
                return false;
            }
        }
        if let Some(category) = &self.category {
            match &job.category {
                Some(c) if contains_ci(c, category) => {}
                _ => return false,
            }
        }
        if let Some(location) = &self.location {
            if !contains_ci(&job.location, location) {
                return false;
            }
        }
        if let Some(min) = self.min_stipend {
            let meets = job.stipend_min.map_or(false, |s| s >= min)
                || job.stipend_max.map_or(false, |s| s >= min);
            if !meets {
                return false;
            }
        }
        if let Some(max) = self.duration_max {
            match job.duration_weeks {
                Some(weeks) if weeks <= max => {}
                _ => return false,
            }
        }
        if let Some(from) = self.start_from {
            match job.start_date {
                Some(start) if start >= from => {}
                _ => return false,
            }
        }
        if !self.skills.iter().all(|s| job.skills.contains(s)) {
            return false;
        }
        self.perks.iter().all(|p| job.perks.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, location: &str) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            company: "Acme".into(),
            location: location.into(),
            posted_by: Uuid::new_v4(),
            require_resume: false,
            job_type: JobType::Job,
            work_mode: WorkMode::Remote,
            category: Some("Design".into()),
            duration_weeks: None,
            stipend_min: None,
            stipend_max: None,
            openings: None,
            skills: vec![],
            perks: vec![],
            start_date: None,
            apply_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn text_filters_match_substrings_case_insensitively() {
        let filter = JobFilter {
            text: Some("rust".into()),
            location: Some("PUNE".into()),
            category: Some("des".into()),
            ..Default::default()
        };
        assert!(filter.matches(&job("Senior Rust Engineer", "Pune")));
        assert!(!filter.matches(&job("Go Engineer", "Pune")));
    }

    #[test]
    fn wildcard_characters_are_literal() {
        let percent = JobFilter { text: Some("100%".into()), ..Default::default() };
        assert!(percent.matches(&job("100% Remote", "Delhi")));
        assert!(!percent.matches(&job("100 Remote", "Delhi")));

        let underscore = JobFilter { location: Some("a_b".into()), ..Default::default() };
        assert!(underscore.matches(&job("Intern", "a_b")));
        assert!(!underscore.matches(&job("Intern", "axb")));

        let backslash = JobFilter { text: Some("c\\d".into()), ..Default::default() };
        assert!(backslash.matches(&job("c\\d ops", "Delhi")));
        assert!(!backslash.matches(&job("cd ops", "Delhi")));
    }
}
