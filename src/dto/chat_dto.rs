use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chat::Chat;
use crate::models::message::Message;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: Uuid,
    pub username: String,
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub id: Uuid,
    pub participants: Vec<ParticipantView>,
    pub job_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ChatView {
    pub fn new(chat: Chat, participants: Vec<ParticipantView>, job_title: Option<String>) -> Self {
        Self {
            id: chat.id,
            participants,
            job_id: chat.job_id,
            application_id: chat.application_id,
            job_title,
            last_message_at: chat.last_message_at,
            created_at: chat.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SenderView {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender: SenderView,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub read_by: Vec<Uuid>,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(Message, SenderView)> for MessageView {
    fn from((message, sender): (Message, SenderView)) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            sender,
            content: message.content,
            file_url: message.file_url,
            file_name: message.file_name,
            file_type: message.file_type,
            read_by: message.read_by,
            edited: message.edited,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

/// Either the provider/applicant pair used when a provider opens a chat from
/// an application, or the generic `{username, recipient}` pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatPayload {
    pub job_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
    pub job_provider_username: Option<String>,
    pub applicant_username: Option<String>,
    pub username: Option<String>,
    pub recipient: Option<String>,
}

impl CreateChatPayload {
    pub fn participants(&self) -> Option<(&str, &str)> {
        fn non_empty(s: &Option<String>) -> Option<&str> {
            s.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        match (
            non_empty(&self.job_provider_username),
            non_empty(&self.applicant_username),
        ) {
            (Some(provider), Some(applicant)) => Some((provider, applicant)),
            _ => Some((non_empty(&self.username)?, non_empty(&self.recipient)?)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditMessagePayload {
    #[validate(length(min = 1))]
    pub username: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsernamePayload {
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub chat_id: Uuid,
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_pair_wins_over_generic_pair() {
        let payload: CreateChatPayload = serde_json::from_value(json!({
            "jobProviderUsername": "bob",
            "applicantUsername": "amy",
            "username": "x",
            "recipient": "y"
        }))
        .unwrap();
        assert_eq!(payload.participants(), Some(("bob", "amy")));

        let generic: CreateChatPayload =
            serde_json::from_value(json!({"username": "amy", "recipient": "cara"})).unwrap();
        assert_eq!(generic.participants(), Some(("amy", "cara")));

        let incomplete: CreateChatPayload = serde_json::from_value(json!({"username": "amy"})).unwrap();
        assert_eq!(incomplete.participants(), None);
    }
}
