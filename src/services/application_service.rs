use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::dto::application_dto::{ApplicantSummary, ApplicationView};
use crate::error::{Error, Result};
use crate::models::application::{ApplicantDetails, Application, ApplicationStatus, NewApplication};
use crate::models::chat::Chat;
use crate::models::job::Job;
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::user::{Role, User};
use crate::services::chat_service::ChatService;
use crate::services::notification_service::NotificationService;
use crate::services::storage_service::{StorageService, Upload};

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
    notifications: NotificationService,
    chats: ChatService,
    storage: StorageService,
}

impl ApplicationService {
    pub fn new(
        store: Arc<dyn Store>,
        notifications: NotificationService,
        chats: ChatService,
        storage: StorageService,
    ) -> Self {
        Self {
            store,
            notifications,
            chats,
            storage,
        }
    }

    async fn seeker(&self, username: &str) -> Result<User> {
        match self.store.find_user_by_username(username).await? {
            Some(user) if user.role == Role::Seeker => Ok(user),
            _ => Err(Error::BadRequest("Invalid job seeker".to_string())),
        }
    }

    async fn job(&self, job_id: Uuid) -> Result<Job> {
        self.store
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    async fn application(&self, id: Uuid) -> Result<Application> {
        self.store
            .find_application(id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    pub async fn apply(
        &self,
        job_id: Uuid,
        username: &str,
        details: ApplicantDetails,
        resume: Option<Upload>,
    ) -> Result<Application> {
        let job = self.job(job_id).await?;
        let applicant = self.seeker(username).await?;

        if self
            .store
            .find_application_for(job.id, applicant.id)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateApplication);
        }
        if job.require_resume && resume.is_none() {
            return Err(Error::BadRequest("A resume is required for this job".to_string()));
        }

        let stored = match &resume {
            Some(upload) => Some(self.storage.save_upload(upload).await?),
            None => None,
        };
        let resume_path = stored.as_ref().map(|f| f.url.clone());

        let inserted = self
            .store
            .insert_application(NewApplication {
                job_id: job.id,
                applicant_id: applicant.id,
                details,
                resume_path: resume_path.clone(),
            })
            .await;
        let application = match inserted {
            Ok(application) => application,
            Err(e) => {
                if let Some(path) = &resume_path {
                    self.storage.remove_quietly(path).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            application_id = %application.id,
            job_id = %job.id,
            applicant = %applicant.username,
            "application submitted"
        );

        if let Some(poster) = self.store.find_user(job.posted_by).await? {
            self.notifications
                .notify(
                    NewNotification::new(
                        poster.username,
                        NotificationKind::Application,
                        format!("{} applied to {}", applicant.username, job.title),
                    )
                    .for_job(job.id)
                    .for_application(application.id),
                )
                .await?;
        }

        Ok(application)
    }

    /// Accepts the application, rejects every sibling for the same job,
    /// notifies the applicant and makes sure the provider and applicant share
    /// a chat anchored to this job and application.
    ///
    /// The steps are not transactional. A failure midway leaves the earlier
    /// steps applied.
    pub async fn select_applicant(&self, application_id: Uuid) -> Result<(Application, Chat)> {
        let application = self.application(application_id).await?;

        let accepted = self
            .store
            .set_application_status(application.id, ApplicationStatus::Accepted)
            .await?;
        let rejected = self
            .store
            .reject_other_applications(accepted.job_id, accepted.id)
            .await?;

        let job = self.job(accepted.job_id).await?;
        let applicant = self
            .store
            .find_user(accepted.applicant_id)
            .await?
            .ok_or_else(|| Error::NotFound("Applicant not found".to_string()))?;

        tracing::info!(
            application_id = %accepted.id,
            job_id = %job.id,
            rejected = rejected,
            "applicant selected"
        );

        self.notifications
            .notify(
                NewNotification::new(
                    applicant.username.clone(),
                    NotificationKind::Selection,
                    format!("Congratulations! You have been selected for {}", job.title),
                )
                .for_job(job.id)
                .for_application(accepted.id),
            )
            .await?;

        let chat = self
            .chats
            .ensure_chat(job.posted_by, applicant.id, Some(job.id), Some(accepted.id))
            .await?;

        Ok((accepted, chat))
    }

    async fn view(&self, application: Application) -> Result<ApplicationView> {
        let job = self.store.find_job(application.job_id).await?;
        let applicant = self
            .store
            .find_user(application.applicant_id)
            .await?
            .map(ApplicantSummary::from);
        Ok(ApplicationView {
            application,
            job,
            applicant,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<ApplicationView> {
        let application = self.application(id).await?;
        self.view(application).await
    }

    pub async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicationView>> {
        let job = self.job(job_id).await?;
        let applications = self.store.list_applications_for_job(job.id).await?;
        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            let applicant = self
                .store
                .find_user(application.applicant_id)
                .await?
                .map(ApplicantSummary::from);
            views.push(ApplicationView {
                application,
                job: Some(job.clone()),
                applicant,
            });
        }
        Ok(views)
    }

    pub async fn list_for_applicant(&self, username: &str) -> Result<Vec<ApplicationView>> {
        let applicant = self.seeker(username).await?;
        let applications = self
            .store
            .list_applications_for_applicant(applicant.id)
            .await?;
        let summary = ApplicantSummary::from(applicant);
        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            let job = self.store.find_job(application.job_id).await?;
            views.push(ApplicationView {
                application,
                job,
                applicant: Some(summary.clone()),
            });
        }
        Ok(views)
    }
}
