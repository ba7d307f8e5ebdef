use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BlockPayload {
    #[validate(length(min = 1))]
    pub blocker: String,
    #[validate(length(min = 1))]
    pub blocked: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockStatusQuery {
    #[serde(rename = "userA")]
    pub user_a: String,
    #[serde(rename = "userB")]
    pub user_b: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    #[validate(length(min = 1))]
    pub reporter: String,
    #[validate(length(min = 1))]
    pub target: String,
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
    pub chat_id: Option<Uuid>,
}
