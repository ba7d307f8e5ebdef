use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{Role, User, UserProfile};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1))]
    pub username: String,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: User,
}
