use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::Store;
use crate::dto::job_dto::{CreateJobPayload, RecommendedJob};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobFilter, NewJob, JobType, WorkMode};
use crate::models::user::{Role, User};
use crate::utils::time::is_within_days;

const RECOMMENDATION_LIMIT: usize = 20;
const FRESH_DAYS: i64 = 14;

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn Store>,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn provider(&self, username: &str) -> Result<User> {
        match self.store.find_user_by_username(username).await? {
            Some(user) if user.role == Role::Provider => Ok(user),
            _ => Err(Error::BadRequest("Invalid job provider".to_string())),
        }
    }

    pub async fn create(&self, payload: CreateJobPayload) -> Result<Job> {
        let provider = self.provider(payload.username.trim()).await?;

        if let (Some(min), Some(max)) = (payload.stipend_min, payload.stipend_max) {
            if min > max {
                return Err(Error::BadRequest(
                    "stipendMin cannot exceed stipendMax".to_string(),
                ));
            }
        }

        let job = self
            .store
            .insert_job(NewJob {
                title: payload.title.trim().to_string(),
                description: payload.description,
                company: payload.company.trim().to_string(),
                location: payload.location.trim().to_string(),
                posted_by: provider.id,
                require_resume: payload.require_resume,
                job_type: payload.job_type.unwrap_or(JobType::Job),
                work_mode: payload.work_mode.unwrap_or(WorkMode::Onsite),
                category: payload.category.filter(|c| !c.trim().is_empty()),
                duration_weeks: payload.duration_weeks,
                stipend_min: payload.stipend_min,
                stipend_max: payload.stipend_max,
                openings: payload.openings,
                skills: payload.skills,
                perks: payload.perks,
                start_date: payload.start_date,
                apply_by: payload.apply_by,
            })
            .await?;

        tracing::info!(job_id = %job.id, provider = %provider.username, "job posted");
        Ok(job)
    }

    pub async fn list_for_provider(&self, username: &str) -> Result<Vec<Job>> {
        let provider = self.provider(username).await?;
        self.store.list_jobs_by_poster(provider.id).await
    }

    pub async fn search(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        self.store.search_jobs(filter).await
    }

    /// Deletes the job and, through the store, its applications and bookmarks.
    /// Chats anchored to the job are left in place.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_job(id).await? {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }

    pub async fn recommend(&self, username: &str) -> Result<Vec<RecommendedJob>> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        let jobs = self.store.search_jobs(&JobFilter::default()).await?;
        Ok(rank(jobs, &user.profile.preferred_categories, Utc::now()))
    }
}

fn score(job: &Job, preferred: &[String], now: DateTime<Utc>) -> u32 {
    let prefers = |value: &str| preferred.iter().any(|p| p.eq_ignore_ascii_case(value.trim()));

    let mut score = 0;
    if job.category.as_deref().map_or(false, prefers) {
        score += 3;
    }
    score += job.skills.iter().filter(|s| prefers(s.as_str())).count() as u32;
    if job.work_mode == WorkMode::Remote {
        score += 1;
    }
    if is_within_days(job.created_at, now, FRESH_DAYS) {
        score += 1;
    }
    score
}

fn rank(jobs: Vec<Job>, preferred: &[String], now: DateTime<Utc>) -> Vec<RecommendedJob> {
    let mut scored: Vec<RecommendedJob> = jobs
        .into_iter()
        .map(|job| RecommendedJob {
            score: score(&job, preferred, now),
            job,
        })
        .filter(|r| r.score > 0)
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.job.created_at.cmp(&a.job.created_at))
    });
    scored.truncate(RECOMMENDATION_LIMIT);
    scored
}
