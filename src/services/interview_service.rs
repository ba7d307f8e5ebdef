use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewKind, NewInterview};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::services::notification_service::NotificationService;

#[derive(Debug, Clone)]
pub struct ScheduleInterview {
    pub application_id: Uuid,
    pub interviewer: String,
    pub date: NaiveDate,
    pub time: String,
    pub kind: InterviewKind,
    pub link: Option<String>,
}

#[derive(Clone)]
pub struct InterviewService {
    store: Arc<dyn Store>,
    notifications: NotificationService,
}

impl InterviewService {
    pub fn new(store: Arc<dyn Store>, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Only the provider who posted the job may schedule interviews for its
    /// applications. The applicant is notified.
    pub async fn schedule(&self, request: ScheduleInterview) -> Result<Interview> {
        let application = self
            .store
            .find_application(request.application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        let job = self
            .store
            .find_job(application.job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        let poster = self.store.find_user(job.posted_by).await?;
        if poster.as_ref().map(|u| u.username.as_str()) != Some(request.interviewer.trim()) {
            return Err(Error::Forbidden(
                "Only the job provider can schedule interviews".to_string(),
            ));
        }
        let applicant = self
            .store
            .find_user(application.applicant_id)
            .await?
            .ok_or_else(|| Error::NotFound("Applicant not found".to_string()))?;

        let time = request.time.trim().to_string();
        if time.is_empty() {
            return Err(Error::BadRequest("time is required".to_string()));
        }

        let interview = self
            .store
            .insert_interview(NewInterview {
                job_id: job.id,
                application_id: application.id,
                interviewer: request.interviewer.trim().to_string(),
                applicant: applicant.username.clone(),
                job_title: job.title.clone(),
                date: request.date,
                time,
                kind: request.kind,
                link: request.link.filter(|l| !l.trim().is_empty()),
            })
            .await?;

        self.notifications
            .notify(
                NewNotification::new(
                    applicant.username,
                    NotificationKind::Interview,
                    format!(
                        "Interview scheduled for {} on {} at {}",
                        job.title, interview.date, interview.time
                    ),
                )
                .for_job(job.id)
                .for_application(application.id),
            )
            .await?;

        Ok(interview)
    }

    pub async fn list(&self, username: &str) -> Result<Vec<Interview>> {
        self.store.list_interviews_for(username.trim()).await
    }
}
