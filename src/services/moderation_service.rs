use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::moderation::{Block, NewReport, Report};

/// Block relationship between two users, seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatus {
    pub blocked: bool,
    pub blocked_by_me: bool,
    pub blocked_me: bool,
}

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn Store>,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::BadRequest(format!("{} is required", field)));
    }
    Ok(value)
}

impl ModerationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Idempotent: blocking an already blocked user returns the existing block.
    pub async fn block(&self, blocker: &str, blocked: &str) -> Result<Block> {
        let blocker = required(blocker, "blocker")?;
        let blocked = required(blocked, "blocked")?;
        if blocker == blocked {
            return Err(Error::BadRequest("You cannot block yourself".to_string()));
        }
        let block = self.store.insert_block(blocker, blocked).await?;
        tracing::info!(blocker = %blocker, blocked = %blocked, "user blocked");
        Ok(block)
    }

    pub async fn unblock(&self, blocker: &str, blocked: &str) -> Result<bool> {
        let blocker = required(blocker, "blocker")?;
        let blocked = required(blocked, "blocked")?;
        self.store.delete_block(blocker, blocked).await
    }

    pub async fn status(&self, user_a: &str, user_b: &str) -> Result<BlockStatus> {
        let user_a = required(user_a, "userA")?;
        let user_b = required(user_b, "userB")?;
        let blocked_by_me = self.store.find_block(user_a, user_b).await?.is_some();
        let blocked_me = self.store.find_block(user_b, user_a).await?.is_some();
        Ok(BlockStatus {
            blocked: blocked_by_me || blocked_me,
            blocked_by_me,
            blocked_me,
        })
    }

    pub async fn report(
        &self,
        reporter: &str,
        target: &str,
        reason: &str,
        chat_id: Option<Uuid>,
    ) -> Result<Report> {
        let report = NewReport {
            reporter: required(reporter, "reporter")?.to_string(),
            target: required(target, "target")?.to_string(),
            reason: required(reason, "reason")?.to_string(),
            chat_id,
        };
        let created = self.store.insert_report(report).await?;
        tracing::warn!(
            report_id = %created.id,
            reporter = %created.reporter,
            target = %created.target,
            "user reported"
        );
        Ok(created)
    }
}
