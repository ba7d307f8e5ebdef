use async_trait::async_trait;
use sqlx::PgPool;
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

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, role, name, email, phone, preferred_categories)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.profile.name)
        .bind(&user.profile.email)
        .bind(&user.profile.phone)
        .bind(&user.profile.preferred_categories)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("Username already exists".to_string()),
            other => other,
        })?;

        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user_profile(&self, id: Uuid, profile: UserProfile) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, phone = $4, preferred_categories = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.preferred_categories)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let created = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, title, description, company, location, posted_by, require_resume,
                job_type, work_mode, category, duration_weeks, stipend_min, stipend_max,
                openings, skills, perks, start_date, apply_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.location)
        .bind(job.posted_by)
        .bind(job.require_resume)
        .bind(job.job_type.as_str())
        .bind(job.work_mode.as_str())
        .bind(&job.category)
        .bind(job.duration_weeks)
        .bind(job.stipend_min)
        .bind(job.stipend_max)
        .bind(job.openings)
        .bind(&job.skills)
        .bind(&job.perks)
        .bind(job.start_date)
        .bind(job.apply_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn list_jobs_by_poster(&self, poster: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE posted_by = $1 ORDER BY created_at DESC",
        )
        .bind(poster)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::text IS NULL OR strpos(lower(title), lower($1)) > 0)
              AND ($2::text IS NULL OR job_type = $2)
              AND ($3::text IS NULL OR work_mode = $3)
              AND ($4::text IS NULL OR strpos(lower(category), lower($4)) > 0)
              AND ($5::text IS NULL OR strpos(lower(location), lower($5)) > 0)
              AND ($6::numeric IS NULL OR stipend_min >= $6 OR stipend_max >= $6)
              AND ($7::int IS NULL OR duration_weeks <= $7)
              AND ($8::date IS NULL OR start_date >= $8)
              AND skills @> $9::text[]
              AND perks @> $10::text[]
            ORDER BY created_at DESC
            "#,
        )
        .bind(&filter.text)
        .bind(filter.job_type.map(|t| t.as_str()))
        .bind(filter.work_mode.map(|m| m.as_str()))
        .bind(&filter.category)
        .bind(&filter.location)
        .bind(filter.min_stipend)
        .bind(filter.duration_max)
        .bind(filter.start_from)
        .bind(&filter.skills)
        .bind(&filter.perks)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        // applications and saved_jobs cascade through their foreign keys
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let details = application.details;
        let created = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                id, job_id, applicant_id, applicant_name, age, address, contact_no, email, resume_path, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application.job_id)
        .bind(application.applicant_id)
        .bind(&details.applicant_name)
        .bind(details.age)
        .bind(&details.address)
        .bind(&details.contact_no)
        .bind(&details.email)
        .bind(&application.resume_path)
        .bind(ApplicationStatus::Applied.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::DuplicateApplication,
            other => other,
        })?;
        Ok(created)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(app)
    }

    async fn find_application_for(&self, job_id: Uuid, applicant_id: Uuid) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 AND applicant_id = $2",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(app)
    }

    async fn list_applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn list_applications_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE applicant_id = $1 ORDER BY created_at DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn set_application_status(&self, id: Uuid, status: ApplicationStatus) -> Result<Application> {
        let app = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(app)
    }

    async fn reject_other_applications(&self, job_id: Uuid, keep: Uuid) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE applications SET status = 'rejected', updated_at = NOW()
            WHERE job_id = $1 AND id <> $2 AND status <> 'rejected'
            "#,
        )
        .bind(job_id)
        .bind(keep)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn insert_chat(&self, chat: NewChat) -> Result<Chat> {
        let created = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (id, participant_one, participant_two, job_id, application_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat.participant_one)
        .bind(chat.participant_two)
        .bind(chat.job_id)
        .bind(chat.application_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_chat(&self, id: Uuid) -> Result<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chat)
    }

    async fn find_chat_between(
        &self,
        a: Uuid,
        b: Uuid,
        job_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Option<Chat>> {
        let (one, two) = ordered_pair(a, b);
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT * FROM chats
            WHERE participant_one = $1 AND participant_two = $2
              AND ($3::uuid IS NULL OR job_id = $3)
              AND ($4::uuid IS NULL OR application_id = $4)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(one)
        .bind(two)
        .bind(job_id)
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(chat)
    }

    async fn list_chats_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT * FROM chats
            WHERE participant_one = $1 OR participant_two = $1
            ORDER BY last_message_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chats)
    }

    async fn touch_chat(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE chats SET last_message_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let attachment = message.attachment;
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, content, file_url, file_name, file_type, read_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, ARRAY[$3]::uuid[])
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(attachment.as_ref().map(|a| a.url.clone()))
        .bind(attachment.as_ref().map(|a| a.name.clone()))
        .bind(attachment.and_then(|a| a.mime_type))
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(message)
    }

    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE chat_id = $1 ORDER BY created_at ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn update_message_content(&self, id: Uuid, content: &str) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages SET content = $2, edited = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    async fn delete_message(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Message not found".to_string()));
        }
        Ok(())
    }

    async fn mark_messages_read(&self, chat_id: Uuid, reader: Uuid) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE messages SET read_by = array_append(read_by, $2)
            WHERE chat_id = $1 AND sender_id <> $2 AND NOT ($2 = ANY(read_by))
            "#,
        )
        .bind(chat_id)
        .bind(reader)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let created = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient, message, kind, job_id, application_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&notification.recipient)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.job_id)
        .bind(notification.application_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_notifications(&self, recipient: &str) -> Result<Vec<Notification>> {
        let items = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient = $1 ORDER BY created_at DESC",
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
        let item = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn mark_all_notifications_read(&self, recipient: &str) -> Result<u64> {
        let res = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient = $1 AND read = FALSE",
        )
        .bind(recipient)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn insert_block(&self, blocker: &str, blocked: &str) -> Result<Block> {
        sqlx::query(
            r#"
            INSERT INTO blocks (id, blocker, blocked)
            VALUES ($1, $2, $3)
            ON CONFLICT (blocker, blocked) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(blocker)
        .bind(blocked)
        .execute(&self.pool)
        .await?;

        let block = sqlx::query_as::<_, Block>(
            "SELECT * FROM blocks WHERE blocker = $1 AND blocked = $2",
        )
        .bind(blocker)
        .bind(blocked)
        .fetch_one(&self.pool)
        .await?;
        Ok(block)
    }

    async fn delete_block(&self, blocker: &str, blocked: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM blocks WHERE blocker = $1 AND blocked = $2")
            .bind(blocker)
            .bind(blocked)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_block(&self, blocker: &str, blocked: &str) -> Result<Option<Block>> {
        let block = sqlx::query_as::<_, Block>(
            "SELECT * FROM blocks WHERE blocker = $1 AND blocked = $2",
        )
        .bind(blocker)
        .bind(blocked)
        .fetch_optional(&self.pool)
        .await?;
        Ok(block)
    }

    async fn insert_report(&self, report: NewReport) -> Result<Report> {
        let created = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (id, reporter, target, reason, chat_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&report.reporter)
        .bind(&report.target)
        .bind(&report.reason)
        .bind(report.chat_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn insert_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<SavedJob> {
        let saved = sqlx::query_as::<_, SavedJob>(
            r#"
            INSERT INTO saved_jobs (id, user_id, job_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::DuplicateSave,
            other => other,
        })?;
        Ok(saved)
    }

    async fn find_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<SavedJob>> {
        let saved = sqlx::query_as::<_, SavedJob>(
            "SELECT * FROM saved_jobs WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT j.* FROM saved_jobs s
            JOIN jobs j ON j.id = s.job_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn delete_saved(&self, user_id: Uuid, job_id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_id = $2")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let created = sqlx::query_as::<_, Interview>(
            r#"
            INSERT INTO interviews (
                id, job_id, application_id, interviewer, applicant, job_title, date, time, kind, link
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(interview.job_id)
        .bind(interview.application_id)
        .bind(&interview.interviewer)
        .bind(&interview.applicant)
        .bind(&interview.job_title)
        .bind(interview.date)
        .bind(&interview.time)
        .bind(interview.kind.as_str())
        .bind(&interview.link)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_interviews_for(&self, username: &str) -> Result<Vec<Interview>> {
        let items = sqlx::query_as::<_, Interview>(
            r#"
            SELECT * FROM interviews
            WHERE interviewer = $1 OR applicant = $1
            ORDER BY date ASC, time ASC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
