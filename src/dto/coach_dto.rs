use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CoachPayload {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachReply {
    pub reply: String,
}
