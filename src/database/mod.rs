pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    application::{Application, ApplicationStatus, NewApplication},
    chat::{Chat, NewChat},
    interview::{Interview, NewInterview},
    job::{Job, JobFilter, NewJob},
    message::{Message, NewMessage},
    moderation::{Block, NewReport, Report},
    notification::{NewNotification, Notification},
    saved::SavedJob,
    user::{NewUser, User, UserProfile},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence boundary shared by every service.
///
/// Lookups return `Ok(None)` for missing rows; mutations addressed by id
/// return `Error::NotFound` when the row is gone.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name of the backing storage, reported by the health check.
    fn backend(&self) -> &'static str;

    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn update_user_profile(&self, id: Uuid, profile: UserProfile) -> Result<User>;

    async fn insert_job(&self, job: NewJob) -> Result<Job>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>>;
    async fn list_jobs_by_poster(&self, poster: Uuid) -> Result<Vec<Job>>;
    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>>;
    /// Removes the job together with its applications and bookmarks.
    async fn delete_job(&self, id: Uuid) -> Result<bool>;

    async fn insert_application(&self, application: NewApplication) -> Result<Application>;
    async fn find_application(&self, id: Uuid) -> Result<Option<Application>>;
    async fn find_application_for(&self, job_id: Uuid, applicant_id: Uuid) -> Result<Option<Application>>;
    async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>>;
    async fn list_applications_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>>;
    async fn set_application_status(&self, id: Uuid, status: ApplicationStatus) -> Result<Application>;
    /// Rejects every application of `job_id` except `keep`. Returns rows changed.
    async fn reject_other_applications(&self, job_id: Uuid, keep: Uuid) -> Result<u64>;

    async fn insert_chat(&self, chat: NewChat) -> Result<Chat>;
    async fn find_chat(&self, id: Uuid) -> Result<Option<Chat>>;
    /// Oldest chat between the two users, narrowed by job/application when given.
    async fn find_chat_between(
        &self,
        a: Uuid,
        b: Uuid,
        job_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Option<Chat>>;
    async fn list_chats_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>>;
    async fn touch_chat(&self, id: Uuid) -> Result<()>;

    async fn insert_message(&self, message: NewMessage) -> Result<Message>;
    async fn find_message(&self, id: Uuid) -> Result<Option<Message>>;
    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>>;
    async fn update_message_content(&self, id: Uuid, content: &str) -> Result<Message>;
    async fn delete_message(&self, id: Uuid) -> Result<()>;
    /// Adds `reader` to every message in the chat it did not send. Returns rows changed.
    async fn mark_messages_read(&self, chat_id: Uuid, reader: Uuid) -> Result<u64>;

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification>;
    async fn list_notifications(&self, recipient: &str) -> Result<Vec<Notification>>;
    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification>;
    async fn mark_all_notifications_read(&self, recipient: &str) -> Result<u64>;

    /// Returns the existing row when the pair is already blocked.
    async fn insert_block(&self, blocker: &str, blocked: &str) -> Result<Block>;
    async fn delete_block(&self, blocker: &str, blocked: &str) -> Result<bool>;
    async fn find_block(&self, blocker: &str, blocked: &str) -> Result<Option<Block>>;
    async fn insert_report(&self, report: NewReport) -> Result<Report>;

    async fn insert_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<SavedJob>;
    async fn find_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<SavedJob>>;
    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<Job>>;
    async fn delete_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<bool>;

    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview>;
    /// Interviews where the user is either interviewer or applicant, soonest first.
    async fn list_interviews_for(&self, username: &str) -> Result<Vec<Interview>>;
}
