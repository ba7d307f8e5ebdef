use std::sync::Arc;

use dashmap::DashMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::{Error, Result};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
/// System prompt plus this many most recent turns are kept per user.
const HISTORY_TURNS: usize = 9;

const SYSTEM_PROMPT: &str = "You are an expert career coach for a job portal focused on empowering women. \
Your name is \"AI Coach\". Keep your responses helpful, encouraging, and concise. \
You can provide resume tips, interview advice, and guidance on finding jobs.";
pub const OFFLINE_REPLY: &str =
    "I am currently offline because my API key is missing. Please contact the administrator.";
pub const TROUBLE_REPLY: &str =
    "I am having trouble connecting to my brain right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Clone)]
pub struct CoachService {
    client: Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    histories: Arc<DashMap<String, Vec<Turn>>>,
}

impl CoachService {
    pub fn new(client: Client, api_key: Option<String>, model: String) -> Self {
        if api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is missing; the coach will answer offline");
        }
        Self {
            client,
            api_key,
            model,
            endpoint: COMPLETIONS_URL.to_string(),
            histories: Arc::new(DashMap::new()),
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(client, config.openai_api_key.clone(), config.openai_model.clone())
    }

    pub async fn ask(&self, username: &str, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::BadRequest("message is required".to_string()));
        }
        let Some(api_key) = &self.api_key else {
            return Ok(OFFLINE_REPLY.to_string());
        };

        // The map guard is released before awaiting the upstream call.
        let conversation = {
            let mut history = self
                .histories
                .entry(username.to_string())
                .or_insert_with(|| vec![Turn::new("system", SYSTEM_PROMPT)]);
            history.push(Turn::new("user", message));
            trim_history(&mut history);
            history.clone()
        };

        match self.complete(api_key, &conversation).await {
            Ok(reply) => {
                if let Some(mut history) = self.histories.get_mut(username) {
                    history.push(Turn::new("assistant", reply.clone()));
                    trim_history(&mut history);
                }
                Ok(reply)
            }
            Err(e) => {
                tracing::error!(username = %username, error = %e, "coach completion failed");
                Ok(TROUBLE_REPLY.to_string())
            }
        }
    }

    async fn complete(&self, api_key: &str, conversation: &[Turn]) -> Result<String> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": conversation,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }

    #[cfg(test)]
    fn history(&self, username: &str) -> Vec<Turn> {
        self.histories
            .get(username)
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

fn trim_history(history: &mut Vec<Turn>) {
    let limit = HISTORY_TURNS + 1;
    if history.len() > limit {
        history.drain(1..history.len() - HISTORY_TURNS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn without_key_the_coach_is_offline() {
        let coach = CoachService::new(Client::new(), None, "gpt-3.5-turbo".into());
        assert_eq!(coach.ask("amy", "help me").await.unwrap(), OFFLINE_REPLY);
        assert!(coach.history("amy").is_empty());
        assert!(matches!(coach.ask("amy", "  ").await, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn upstream_failure_gets_the_fixed_reply() {
        let mut coach = CoachService::new(Client::new(), Some("key".into()), "gpt-3.5-turbo".into());
        coach.endpoint = "http://127.0.0.1:9/v1/chat/completions".into();

        assert_eq!(coach.ask("amy", "resume tips?").await.unwrap(), TROUBLE_REPLY);
        let history = coach.history("amy");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "system");
        assert_eq!(history[1].content, "resume tips?");
    }

    #[tokio::test]
    async fn repeated_failures_keep_history_bounded() {
        let mut coach = CoachService::new(Client::new(), Some("key".into()), "gpt-3.5-turbo".into());
        coach.endpoint = "http://127.0.0.1:9/v1/chat/completions".into();

        for i in 0..25 {
            assert_eq!(coach.ask("amy", &format!("question {}", i)).await.unwrap(), TROUBLE_REPLY);
        }
        let history = coach.history("amy");
        assert_eq!(history.len(), HISTORY_TURNS + 1);
        assert_eq!(history[0].role, "system");
        assert_eq!(history.last().map(|t| t.content.as_str()), Some("question 24"));
    }

    #[test]
    fn trimming_keeps_system_prompt_and_recent_turns() {
        let mut history = vec![Turn::new("system", SYSTEM_PROMPT)];
        for i in 0..14 {
            history.push(Turn::new("user", i.to_string()));
        }
        trim_history(&mut history);

        assert_eq!(history.len(), HISTORY_TURNS + 1);
        assert_eq!(history[0].role, "system");
        assert_eq!(history[1].content, "5");
        assert_eq!(history.last().map(|t| t.content.as_str()), Some("13"));
    }
}
