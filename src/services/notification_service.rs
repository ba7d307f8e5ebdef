use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::error::Result;
use crate::models::notification::{NewNotification, Notification};
use crate::realtime::{events, user_room, Broadcaster, ConnectionRegistry};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
    broadcaster: Arc<dyn Broadcaster>,
    registry: ConnectionRegistry,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn Store>,
        broadcaster: Arc<dyn Broadcaster>,
        registry: ConnectionRegistry,
    ) -> Self {
        Self {
            store,
            broadcaster,
            registry,
        }
    }

    /// Persists the notification and pushes it to the recipient's personal
    /// room when they have a registered socket.
    pub async fn notify(&self, notification: NewNotification) -> Result<Notification> {
        let created = self.store.insert_notification(notification).await?;

        if self.registry.is_online(&created.recipient) {
            let payload = serde_json::to_value(&created)?;
            self.broadcaster
                .emit(&user_room(&created.recipient), events::NOTIFICATION, &payload);
        }

        Ok(created)
    }

    pub async fn list(&self, username: &str) -> Result<Vec<Notification>> {
        self.store.list_notifications(username).await
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification> {
        self.store.mark_notification_read(id).await
    }

    pub async fn mark_all_read(&self, username: &str) -> Result<u64> {
        self.store.mark_all_notifications_read(username).await
    }
}
