use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::{
    application::{Application, ApplicationStatus, NewApplication},
    chat::{ordered_pair, Chat, NewChat},
    interview::{Interview, NewInterview},
    job::{Job, JobFilter, NewJob},
    message::{Message, NewMessage},
    moderation::{Block, NewReport, Report},
    notification::{NewNotification, Notification},
    saved::SavedJob,
    user::{NewUser, User, UserProfile},
};

/// Rows are kept in insertion order, so "newest first" listings walk each
/// table backwards.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    chats: Vec<Chat>,
    messages: Vec<Message>,
    notifications: Vec<Notification>,
    blocks: Vec<Block>,
    reports: Vec<Report>,
    saved: Vec<SavedJob>,
    interviews: Vec<Interview>,
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(Error::Conflict("Username already exists".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            profile: user.profile,
            created_at: now,
            updated_at: now,
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_user_profile(&self, id: Uuid, profile: UserProfile) -> Result<User> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        user.profile = profile;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let now = Utc::now();
        let created = Job {
            id: Uuid::new_v4(),
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            posted_by: job.posted_by,
            require_resume: job.require_resume,
            job_type: job.job_type,
            work_mode: job.work_mode,
            category: job.category,
            duration_weeks: job.duration_weeks,
            stipend_min: job.stipend_min,
            stipend_max: job.stipend_max,
            openings: job.openings,
            skills: job.skills,
            perks: job.perks,
            start_date: job.start_date,
            apply_by: job.apply_by,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.jobs.push(created.clone());
        Ok(created)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jobs_by_poster(&self, poster: Uuid) -> Result<Vec<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs.iter().rev().filter(|j| j.posted_by == poster).cloned().collect())
    }

    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs.iter().rev().filter(|j| filter.matches(j)).cloned().collect())
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.jobs.len();
        t.jobs.retain(|j| j.id != id);
        if t.jobs.len() == before {
            return Ok(false);
        }
        t.applications.retain(|a| a.job_id != id);
        t.saved.retain(|s| s.job_id != id);
        Ok(true)
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let mut t = self.tables.write().await;
        if t
            .applications
            .iter()
            .any(|a| a.job_id == application.job_id && a.applicant_id == application.applicant_id)
        {
            return Err(Error::DuplicateApplication);
        }
        let now = Utc::now();
        let details = application.details;
        let created = Application {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            applicant_id: application.applicant_id,
            applicant_name: details.applicant_name,
            age: details.age,
            address: details.address,
            contact_no: details.contact_no,
            email: details.email,
            resume_path: application.resume_path,
            status: ApplicationStatus::Applied,
            created_at: now,
            updated_at: now,
        };
        t.applications.push(created.clone());
        Ok(created)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application_for(&self, job_id: Uuid, applicant_id: Uuid) -> Result<Option<Application>> {
        let t = self.tables.read().await;
        Ok(t
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.applicant_id == applicant_id)
            .cloned())
    }

    async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications.iter().rev().filter(|a| a.job_id == job_id).cloned().collect())
    }

    async fn list_applications_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>> {
        let t = self.tables.read().await;
        Ok(t
            .applications
            .iter()
            .rev()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect())
    }

    async fn set_application_status(&self, id: Uuid, status: ApplicationStatus) -> Result<Application> {
        let mut t = self.tables.write().await;
        let app = t
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        app.status = status;
        app.updated_at = Utc::now();
        Ok(app.clone())
    }

    async fn reject_other_applications(&self, job_id: Uuid, keep: Uuid) -> Result<u64> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for app in t
            .applications
            .iter_mut()
            .filter(|a| a.job_id == job_id && a.id != keep && a.status != ApplicationStatus::Rejected)
        {
            app.status = ApplicationStatus::Rejected;
            app.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn insert_chat(&self, chat: NewChat) -> Result<Chat> {
        let now = Utc::now();
        let created = Chat {
            id: Uuid::new_v4(),
            participant_one: chat.participant_one,
            participant_two: chat.participant_two,
            job_id: chat.job_id,
            application_id: chat.application_id,
            last_message_at: now,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.chats.push(created.clone());
        Ok(created)
    }

    async fn find_chat(&self, id: Uuid) -> Result<Option<Chat>> {
        let t = self.tables.read().await;
        Ok(t.chats.iter().find(|c| c.id == id).cloned())
    }

    async fn find_chat_between(
        &self,
        a: Uuid,
        b: Uuid,
        job_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Option<Chat>> {
        let (one, two) = ordered_pair(a, b);
        let t = self.tables.read().await;
        Ok(t
            .chats
            .iter()
            .find(|c| {
                c.participant_one == one
                    && c.participant_two == two
                    && job_id.map_or(true, |j| c.job_id == Some(j))
                    && application_id.map_or(true, |id| c.application_id == Some(id))
            })
            .cloned())
    }

    async fn list_chats_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>> {
        let t = self.tables.read().await;
        let mut chats: Vec<Chat> = t.chats.iter().filter(|c| c.includes(user_id)).cloned().collect();
        chats.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(chats)
    }

    async fn touch_chat(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write().await;
        if let Some(chat) = t.chats.iter_mut().find(|c| c.id == id) {
            let now = Utc::now();
            chat.last_message_at = now;
            chat.updated_at = now;
        }
        Ok(())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let now = Utc::now();
        let attachment = message.attachment;
        let created = Message {
            id: Uuid::new_v4(),
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            content: message.content,
            file_url: attachment.as_ref().map(|a| a.url.clone()),
            file_name: attachment.as_ref().map(|a| a.name.clone()),
            file_type: attachment.and_then(|a| a.mime_type),
            read_by: vec![message.sender_id],
            edited: false,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.messages.push(created.clone());
        Ok(created)
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>> {
        let t = self.tables.read().await;
        Ok(t.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>> {
        let t = self.tables.read().await;
        Ok(t.messages.iter().filter(|m| m.chat_id == chat_id).cloned().collect())
    }

    async fn update_message_content(&self, id: Uuid, content: &str) -> Result<Message> {
        let mut t = self.tables.write().await;
        let message = t
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::NotFound("Message not found".to_string()))?;
        message.content = Some(content.to_string());
        message.edited = true;
        message.updated_at = Utc::now();
        Ok(message.clone())
    }

    async fn delete_message(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write().await;
        let before = t.messages.len();
        t.messages.retain(|m| m.id != id);
        if t.messages.len() == before {
            return Err(Error::NotFound("Message not found".to_string()));
        }
        Ok(())
    }

    async fn mark_messages_read(&self, chat_id: Uuid, reader: Uuid) -> Result<u64> {
        let mut t = self.tables.write().await;
        let mut changed = 0;
        for message in t
            .messages
            .iter_mut()
            .filter(|m| m.chat_id == chat_id && m.sender_id != reader && !m.read_by.contains(&reader))
        {
            message.read_by.push(reader);
            changed += 1;
        }
        Ok(changed)
    }

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let created = Notification {
            id: Uuid::new_v4(),
            recipient: notification.recipient,
            message: notification.message,
            kind: notification.kind,
            job_id: notification.job_id,
            application_id: notification.application_id,
            read: false,
            created_at: Utc::now(),
        };
        self.tables.write().await.notifications.push(created.clone());
        Ok(created)
    }

    async fn list_notifications(&self, recipient: &str) -> Result<Vec<Notification>> {
        let t = self.tables.read().await;
        Ok(t
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
        let mut t = self.tables.write().await;
        let item = t
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound("Notification not found".to_string()))?;
        item.read = true;
        Ok(item.clone())
    }

    async fn mark_all_notifications_read(&self, recipient: &str) -> Result<u64> {
        let mut t = self.tables.write().await;
        let mut changed = 0;
        for item in t
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.read)
        {
            item.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn insert_block(&self, blocker: &str, blocked: &str) -> Result<Block> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t
            .blocks
            .iter()
            .find(|b| b.blocker == blocker && b.blocked == blocked)
        {
            return Ok(existing.clone());
        }
        let block = Block {
            id: Uuid::new_v4(),
            blocker: blocker.to_string(),
            blocked: blocked.to_string(),
            created_at: Utc::now(),
        };
        t.blocks.push(block.clone());
        Ok(block)
    }

    async fn delete_block(&self, blocker: &str, blocked: &str) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.blocks.len();
        t.blocks.retain(|b| !(b.blocker == blocker && b.blocked == blocked));
        Ok(t.blocks.len() != before)
    }

    async fn find_block(&self, blocker: &str, blocked: &str) -> Result<Option<Block>> {
        let t = self.tables.read().await;
        Ok(t
            .blocks
            .iter()
            .find(|b| b.blocker == blocker && b.blocked == blocked)
            .cloned())
    }

    async fn insert_report(&self, report: NewReport) -> Result<Report> {
        let created = Report {
            id: Uuid::new_v4(),
            reporter: report.reporter,
            target: report.target,
            reason: report.reason,
            chat_id: report.chat_id,
            created_at: Utc::now(),
        };
        self.tables.write().await.reports.push(created.clone());
        Ok(created)
    }

    async fn insert_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<SavedJob> {
        let mut t = self.tables.write().await;
        if t.saved.iter().any(|s| s.user_id == user_id && s.job_id == job_id) {
            return Err(Error::DuplicateSave);
        }
        let saved = SavedJob {
            id: Uuid::new_v4(),
            user_id,
            job_id,
            created_at: Utc::now(),
        };
        t.saved.push(saved.clone());
        Ok(saved)
    }

    async fn find_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<SavedJob>> {
        let t = self.tables.read().await;
        Ok(t
            .saved
            .iter()
            .find(|s| s.user_id == user_id && s.job_id == job_id)
            .cloned())
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<Job>> {
        let t = self.tables.read().await;
        Ok(t
            .saved
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .filter_map(|s| t.jobs.iter().find(|j| j.id == s.job_id).cloned())
            .collect())
    }

    async fn delete_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.saved.len();
        t.saved.retain(|s| !(s.user_id == user_id && s.job_id == job_id));
        Ok(t.saved.len() != before)
    }

    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let created = Interview {
            id: Uuid::new_v4(),
            job_id: interview.job_id,
            application_id: interview.application_id,
            interviewer: interview.interviewer,
            applicant: interview.applicant,
            job_title: interview.job_title,
            date: interview.date,
            time: interview.time,
            kind: interview.kind,
            link: interview.link,
            created_at: Utc::now(),
        };
        self.tables.write().await.interviews.push(created.clone());
        Ok(created)
    }

    async fn list_interviews_for(&self, username: &str) -> Result<Vec<Interview>> {
        let t = self.tables.read().await;
        let mut items: Vec<Interview> = t
            .interviews
            .iter()
            .filter(|i| i.interviewer == username || i.applicant == username)
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JobType, WorkMode};
    use crate::models::user::Role;

    async fn provider(store: &MemoryStore) -> User {
        store
            .create_user(NewUser {
                username: "bob".to_string(),
                password_hash: "x".to_string(),
                role: Role::Provider,
                profile: UserProfile::default(),
            })
            .await
            .unwrap()
    }

    fn job(posted_by: Uuid, title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            description: "d".to_string(),
            company: "c".to_string(),
            location: "Berlin".to_string(),
            posted_by,
            require_resume: false,
            job_type: JobType::Job,
            work_mode: WorkMode::Onsite,
            category: None,
            duration_weeks: None,
            stipend_min: None,
            stipend_max: None,
            openings: None,
            skills: vec![],
            perks: vec![],
            start_date: None,
            apply_by: None,
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        provider(&store).await;
        let err = store
            .create_user(NewUser {
                username: "bob".to_string(),
                password_hash: "y".to_string(),
                role: Role::Seeker,
                profile: UserProfile::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_job_cascades_to_applications_and_bookmarks() {
        let store = MemoryStore::new();
        let bob = provider(&store).await;
        let kept = store.insert_job(job(bob.id, "kept")).await.unwrap();
        let gone = store.insert_job(job(bob.id, "gone")).await.unwrap();
        let applicant = Uuid::new_v4();
        for job_id in [kept.id, gone.id] {
            store
                .insert_application(NewApplication {
                    job_id,
                    applicant_id: applicant,
                    details: Default::default(),
                    resume_path: None,
                })
                .await
                .unwrap();
            store.insert_saved(applicant, job_id).await.unwrap();
        }

        assert!(store.delete_job(gone.id).await.unwrap());

        assert!(store.list_applications_for_job(gone.id).await.unwrap().is_empty());
        assert_eq!(store.list_applications_for_job(kept.id).await.unwrap().len(), 1);
        let saved = store.list_saved_jobs(applicant).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, kept.id);
        assert!(!store.delete_job(gone.id).await.unwrap());
    }

    #[tokio::test]
    async fn blocking_twice_keeps_one_row() {
        let store = MemoryStore::new();
        let first = store.insert_block("amy", "cara").await.unwrap();
        let second = store.insert_block("amy", "cara").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(store.find_block("cara", "amy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = MemoryStore::new();
        let bob = provider(&store).await;
        store.insert_job(job(bob.id, "first")).await.unwrap();
        store.insert_job(job(bob.id, "second")).await.unwrap();
        let jobs = store.list_jobs_by_poster(bob.id).await.unwrap();
        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
    }
}
