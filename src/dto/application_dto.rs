use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::application::Application;
use crate::models::job::Job;
use crate::models::user::{User, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub username: String,
    pub profile: UserProfile,
}

impl From<User> for ApplicantSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            profile: user.profile,
        }
    }
}

/// Application with its job and applicant resolved. Either side may be gone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<Job>,
    pub applicant: Option<ApplicantSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmitted {
    pub message: String,
    pub application: Application,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub message: String,
    pub application_id: Uuid,
    pub chat_id: Uuid,
}
