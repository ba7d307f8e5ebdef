use std::sync::Arc;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::user::{NewUser, Role, User, UserProfile};
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        role: Role,
        profile: UserProfile,
    ) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::BadRequest("All fields are required".to_string()));
        }
        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(Error::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                role,
                profile,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    /// Unknown usernames and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let invalid = || Error::BadRequest("Invalid credentials".to_string());
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .ok_or_else(invalid)?;

        let ok = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            tracing::warn!(username = %user.username, error = %e, "stored password hash is unreadable");
            false
        });
        if !ok {
            return Err(invalid());
        }
        Ok(user)
    }

    pub async fn update_profile(&self, username: &str, profile: UserProfile) -> Result<User> {
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        self.store.update_user_profile(user.id, profile).await
    }
}
