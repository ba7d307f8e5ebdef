use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::models::saved::SavedJob;
use crate::models::user::{Role, User};

#[derive(Clone)]
pub struct SavedService {
    store: Arc<dyn Store>,
}

impl SavedService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn seeker(&self, username: &str) -> Result<User> {
        match self.store.find_user_by_username(username).await? {
            Some(user) if user.role == Role::Seeker => Ok(user),
            _ => Err(Error::BadRequest("Invalid job seeker".to_string())),
        }
    }

    /// Bookmarks a job. Saving the same job twice yields `DuplicateSave`.
    pub async fn save(&self, username: &str, job_id: Uuid) -> Result<SavedJob> {
        let user = self.seeker(username).await?;
        if self.store.find_job(job_id).await?.is_none() {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        if self.store.find_saved(user.id, job_id).await?.is_some() {
            return Err(Error::DuplicateSave);
        }
        self.store.insert_saved(user.id, job_id).await
    }

    pub async fn list(&self, username: &str) -> Result<Vec<Job>> {
        let user = self.seeker(username).await?;
        self.store.list_saved_jobs(user.id).await
    }

    pub async fn remove(&self, username: &str, job_id: Uuid) -> Result<bool> {
        let user = self.seeker(username).await?;
        self.store.delete_saved(user.id, job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Harness;

    #[tokio::test]
    async fn save_list_remove() {
        let h = Harness::new();
        let bob = h.user("bob", Role::Provider).await;
        h.user("amy", Role::Seeker).await;
        let first = h.job(&bob, "First").await;
        let second = h.job(&bob, "Second").await;
        let service = SavedService::new(h.store());

        service.save("amy", first.id).await.unwrap();
        service.save("amy", second.id).await.unwrap();
        assert!(matches!(service.save("amy", first.id).await, Err(Error::DuplicateSave)));

        let titles: Vec<_> = service
            .list("amy")
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, ["Second", "First"]);

        assert!(service.remove("amy", first.id).await.unwrap());
        assert!(!service.remove("amy", first.id).await.unwrap());
        assert_eq!(service.list("amy").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn providers_and_missing_jobs_are_rejected() {
        let h = Harness::new();
        let bob = h.user("bob", Role::Provider).await;
        h.user("amy", Role::Seeker).await;
        let job = h.job(&bob, "Job").await;
        let service = SavedService::new(h.store());

        assert!(matches!(service.save("bob", job.id).await, Err(Error::BadRequest(_))));
        assert!(matches!(
            service.save("amy", Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }
}
