pub mod application_service;
pub mod auth_service;
pub mod chat_service;
pub mod coach_service;
pub mod interview_service;
pub mod job_service;
pub mod moderation_service;
pub mod notification_service;
pub mod saved_service;
pub mod storage_service;
pub mod translation_service;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::database::{MemoryStore, Store};
    use crate::dto::job_dto::CreateJobPayload;
    use crate::models::job::Job;
    use crate::models::user::{NewUser, Role, User, UserProfile};
    use crate::realtime::testing::RecordingBroadcaster;
    use crate::realtime::ConnectionRegistry;

    use super::application_service::ApplicationService;
    use super::chat_service::ChatService;
    use super::job_service::JobService;
    use super::notification_service::NotificationService;
    use super::storage_service::StorageService;

    /// In-memory wiring of the services, sharing one store and one
    /// recording broadcaster.
    pub struct Harness {
        pub store: Arc<MemoryStore>,
        pub broadcaster: Arc<RecordingBroadcaster>,
        pub registry: ConnectionRegistry,
        pub storage: StorageService,
    }

    impl Harness {
        pub fn new() -> Self {
            let root = std::env::temp_dir().join(format!("jobportal-test-{}", uuid::Uuid::new_v4()));
            Self {
                store: Arc::new(MemoryStore::new()),
                broadcaster: Arc::new(RecordingBroadcaster::default()),
                registry: ConnectionRegistry::new(),
                storage: StorageService::new(root),
            }
        }

        pub fn store(&self) -> Arc<dyn Store> {
            self.store.clone()
        }

        pub fn notifications(&self) -> NotificationService {
            NotificationService::new(self.store(), self.broadcaster.clone(), self.registry.clone())
        }

        pub fn chats(&self) -> ChatService {
            ChatService::new(
                self.store(),
                self.broadcaster.clone(),
                self.registry.clone(),
                self.notifications(),
                self.storage.clone(),
            )
        }

        pub fn applications(&self) -> ApplicationService {
            ApplicationService::new(
                self.store(),
                self.notifications(),
                self.chats(),
                self.storage.clone(),
            )
        }

        pub async fn user(&self, username: &str, role: Role) -> User {
            self.store
                .create_user(NewUser {
                    username: username.to_string(),
                    password_hash: "not-a-hash".to_string(),
                    role,
                    profile: UserProfile::default(),
                })
                .await
                .unwrap()
        }

        pub async fn job(&self, poster: &User, title: &str) -> Job {
            JobService::new(self.store())
                .create(job_payload(&poster.username, title))
                .await
                .unwrap()
        }
    }

    pub fn job_payload(username: &str, title: &str) -> CreateJobPayload {
        CreateJobPayload {
            username: username.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            company: "Acme".to_string(),
            location: "Dushanbe".to_string(),
            require_resume: false,
            job_type: None,
            work_mode: None,
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
}
