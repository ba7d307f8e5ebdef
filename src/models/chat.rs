use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A two-party conversation. Participants are stored in ascending id order so
/// the same pair always produces the same row shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub participant_one: Uuid,
    pub participant_two: Uuid,
    pub job_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn participants(&self) -> [Uuid; 2] {
        [self.participant_one, self.participant_two]
    }

    pub fn includes(&self, user_id: Uuid) -> bool {
        self.participant_one == user_id || self.participant_two == user_id
    }

    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        if self.participant_one == user_id {
            Some(self.participant_two)
        } else if self.participant_two == user_id {
            Some(self.participant_one)
        } else {
            None
        }
    }

    /// Room name used on the real-time channel.
    pub fn room(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct NewChat {
    pub participant_one: Uuid,
    pub participant_two: Uuid,
    pub job_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
}

impl NewChat {
    pub fn new(a: Uuid, b: Uuid, job_id: Option<Uuid>, application_id: Option<Uuid>) -> Self {
        let (participant_one, participant_two) = ordered_pair(a, b);
        Self {
            participant_one,
            participant_two,
            job_id,
            application_id,
        }
    }
}

pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chat_orders_participants() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let left = NewChat::new(a, b, None, None);
        let right = NewChat::new(b, a, None, None);
        assert_eq!(left.participant_one, right.participant_one);
        assert_eq!(left.participant_two, right.participant_two);
    }

    #[test]
    fn other_participant_requires_membership() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (one, two) = ordered_pair(a, b);
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            participant_one: one,
            participant_two: two,
            job_id: None,
            application_id: None,
            last_message_at: now,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(chat.other_participant(a), Some(b));
        assert_eq!(chat.other_participant(b), Some(a));
        assert_eq!(chat.other_participant(Uuid::new_v4()), None);
    }
}
