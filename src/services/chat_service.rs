use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::Store;
use crate::dto::chat_dto::{ChatView, MessageView, ParticipantView, SenderView};
use crate::error::{Error, Result};
use crate::models::chat::{Chat, NewChat};
use crate::models::message::{Attachment, Message, NewMessage};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::user::User;
use crate::realtime::{events, Broadcaster, ConnectionRegistry};
use crate::services::notification_service::NotificationService;
use crate::services::storage_service::StorageService;

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn Store>,
    broadcaster: Arc<dyn Broadcaster>,
    registry: ConnectionRegistry,
    notifications: NotificationService,
    storage: StorageService,
    creation_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn Store>,
        broadcaster: Arc<dyn Broadcaster>,
        registry: ConnectionRegistry,
        notifications: NotificationService,
        storage: StorageService,
    ) -> Self {
        Self {
            store,
            broadcaster,
            registry,
            notifications,
            storage,
            creation_locks: Arc::new(DashMap::new()),
        }
    }

    async fn user_by_name(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User '{}' not found", username)))
    }

    async fn chat(&self, chat_id: Uuid) -> Result<Chat> {
        self.store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| Error::NotFound("Chat not found".to_string()))
    }

    async fn message(&self, message_id: Uuid) -> Result<Message> {
        self.store
            .find_message(message_id)
            .await?
            .ok_or_else(|| Error::NotFound("Message not found".to_string()))
    }

    /// Looks up the chat between two users and creates it when absent.
    /// Concurrent calls for the same key are serialized.
    pub async fn get_or_create_chat(
        &self,
        a: &str,
        b: &str,
        job_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<ChatView> {
        let first = self.user_by_name(a).await?;
        let second = self.user_by_name(b).await?;
        let chat = self.ensure_chat(first.id, second.id, job_id, application_id).await?;
        self.chat_view(chat).await
    }

    pub async fn ensure_chat(
        &self,
        a: Uuid,
        b: Uuid,
        job_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Chat> {
        if a == b {
            return Err(Error::BadRequest(
                "A chat needs two different participants".to_string(),
            ));
        }

        let draft = NewChat::new(a, b, job_id, application_id);
        let key = format!(
            "{}:{}:{}:{}",
            draft.participant_one,
            draft.participant_two,
            job_id.map(|id| id.to_string()).unwrap_or_default(),
            application_id.map(|id| id.to_string()).unwrap_or_default(),
        );
        let lock = self
            .creation_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            match self.store.find_chat_between(a, b, job_id, application_id).await {
                Ok(Some(existing)) => Ok(existing),
                Ok(None) => {
                    let created = self.store.insert_chat(draft).await;
                    if let Ok(chat) = &created {
                        tracing::info!(chat_id = %chat.id, "chat created");
                    }
                    created
                }
                Err(e) => Err(e),
            }
        };

        drop(lock);
        self.creation_locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn participant(&self, user_id: Uuid) -> Result<ParticipantView> {
        let username = self
            .store
            .find_user(user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_default();
        let online = self.registry.is_online(&username);
        Ok(ParticipantView {
            id: user_id,
            username,
            online,
        })
    }

    async fn chat_view(&self, chat: Chat) -> Result<ChatView> {
        let mut participants = Vec::with_capacity(2);
        for id in chat.participants() {
            participants.push(self.participant(id).await?);
        }
        let job_title = match chat.job_id {
            Some(job_id) => self.store.find_job(job_id).await?.map(|j| j.title),
            None => None,
        };
        Ok(ChatView::new(chat, participants, job_title))
    }

    async fn message_view(&self, message: Message) -> Result<MessageView> {
        let username = self
            .store
            .find_user(message.sender_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_default();
        let sender = SenderView {
            id: message.sender_id,
            username,
        };
        Ok(MessageView::from((message, sender)))
    }

    pub async fn list_chats(&self, username: &str) -> Result<Vec<ChatView>> {
        let user = self.user_by_name(username).await?;
        let chats = self.store.list_chats_for_user(user.id).await?;
        let mut views = Vec::with_capacity(chats.len());
        for chat in chats {
            views.push(self.chat_view(chat).await?);
        }
        Ok(views)
    }

    pub async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<MessageView>> {
        self.chat(chat_id).await?;
        let messages = self.store.list_messages(chat_id).await?;

        let mut senders: HashMap<Uuid, SenderView> = HashMap::new();
        let mut views = Vec::with_capacity(messages.len());
        for message in messages {
            let sender = match senders.get(&message.sender_id) {
                Some(sender) => sender.clone(),
                None => {
                    let username = self
                        .store
                        .find_user(message.sender_id)
                        .await?
                        .map(|u| u.username)
                        .unwrap_or_default();
                    let sender = SenderView {
                        id: message.sender_id,
                        username,
                    };
                    senders.insert(message.sender_id, sender.clone());
                    sender
                }
            };
            views.push(MessageView::from((message, sender)));
        }
        Ok(views)
    }

    /// Sends a message into the chat. An attachment that was already written
    /// to storage is removed again when the send is refused.
    pub async fn send_message(
        &self,
        chat_id: Uuid,
        sender_username: &str,
        content: Option<String>,
        attachment: Option<Attachment>,
    ) -> Result<MessageView> {
        let file_url = attachment.as_ref().map(|a| a.url.clone());
        let result = self
            .deliver(chat_id, sender_username, content, attachment)
            .await;
        if result.is_err() {
            if let Some(url) = file_url {
                self.storage.remove_quietly(&url).await;
            }
        }
        result
    }

    async fn deliver(
        &self,
        chat_id: Uuid,
        sender_username: &str,
        content: Option<String>,
        attachment: Option<Attachment>,
    ) -> Result<MessageView> {
        let chat = self.chat(chat_id).await?;

        let sender = self
            .store
            .find_user_by_username(sender_username)
            .await?
            .ok_or_else(|| Error::InvalidSender("Sender not found".to_string()))?;
        let recipient_id = chat.other_participant(sender.id).ok_or_else(|| {
            Error::InvalidSender("Sender is not a participant in this chat".to_string())
        })?;

        let content = content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if content.is_none() && attachment.is_none() {
            return Err(Error::BadRequest(
                "Message must have text content or a file".to_string(),
            ));
        }

        let recipient = self
            .store
            .find_user(recipient_id)
            .await?
            .ok_or_else(|| Error::NotFound("Recipient not found".to_string()))?;

        if self.is_blocked_between(&sender.username, &recipient.username).await? {
            tracing::info!(
                chat_id = %chat.id,
                sender = %sender.username,
                recipient = %recipient.username,
                "message refused, users are blocked"
            );
            return Err(Error::DeliveryBlocked);
        }

        let message = self
            .store
            .insert_message(NewMessage {
                chat_id: chat.id,
                sender_id: sender.id,
                content,
                attachment,
            })
            .await?;
        self.store.touch_chat(chat.id).await?;

        let mut notification = NewNotification::new(
            recipient.username.clone(),
            NotificationKind::Message,
            format!("New message from {}", sender.username),
        );
        if let Some(job_id) = chat.job_id {
            notification = notification.for_job(job_id);
        }
        if let Some(application_id) = chat.application_id {
            notification = notification.for_application(application_id);
        }
        self.notifications.notify(notification).await?;

        let view = MessageView::from((
            message,
            SenderView {
                id: sender.id,
                username: sender.username,
            },
        ));
        self.broadcaster
            .emit(&chat.room(), events::NEW_MESSAGE, &serde_json::to_value(&view)?);
        Ok(view)
    }

    async fn is_blocked_between(&self, a: &str, b: &str) -> Result<bool> {
        if self.store.find_block(a, b).await?.is_some() {
            return Ok(true);
        }
        Ok(self.store.find_block(b, a).await?.is_some())
    }

    async fn owned_message(&self, message_id: Uuid, requestor: &str, action: &str) -> Result<Message> {
        let message = self.message(message_id).await?;
        let owner = self.store.find_user_by_username(requestor).await?;
        match owner {
            Some(user) if user.id == message.sender_id => Ok(message),
            _ => Err(Error::Forbidden(format!(
                "Only the sender can {} this message",
                action
            ))),
        }
    }

    pub async fn edit_message(
        &self,
        message_id: Uuid,
        requestor: &str,
        new_content: &str,
    ) -> Result<MessageView> {
        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(Error::BadRequest("Message content cannot be empty".to_string()));
        }

        let message = self.owned_message(message_id, requestor, "edit").await?;
        let updated = self
            .store
            .update_message_content(message.id, new_content)
            .await?;

        let view = self.message_view(updated).await?;
        self.broadcaster.emit(
            &view.chat_id.to_string(),
            events::MESSAGE_EDITED,
            &serde_json::to_value(&view)?,
        );
        Ok(view)
    }

    pub async fn delete_message(&self, message_id: Uuid, requestor: &str) -> Result<()> {
        let message = self.owned_message(message_id, requestor, "delete").await?;

        if let Some(url) = &message.file_url {
            self.storage.remove_quietly(url).await;
        }
        self.store.delete_message(message.id).await?;

        self.broadcaster.emit(
            &message.chat_id.to_string(),
            events::MESSAGE_DELETED,
            &json!({ "messageId": message.id, "chatId": message.chat_id }),
        );
        Ok(())
    }

    /// Marks every message in the chat not sent by `username` as read by them.
    pub async fn mark_read(&self, chat_id: Uuid, username: &str) -> Result<u64> {
        let chat = self.chat(chat_id).await?;
        let reader = self.user_by_name(username).await?;
        if !chat.includes(reader.id) {
            return Err(Error::Forbidden(
                "Only participants can read this chat".to_string(),
            ));
        }

        let updated = self.store.mark_messages_read(chat.id, reader.id).await?;
        if updated > 0 {
            self.broadcaster.emit(
                &chat.room(),
                events::MESSAGES_READ,
                &json!({ "chatId": chat.id, "username": reader.username, "count": updated }),
            );
        }
        Ok(updated)
    }

    /// Builds the transient typing event. Nothing is stored.
    pub fn mark_typing(&self, chat_id: &str, username: &str) -> Value {
        json!({ "chatId": chat_id, "username": username, "at": Utc::now() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationKind;
    use crate::models::user::Role;
    use crate::services::test_support::Harness;

    async fn chat_between(h: &Harness, a: &str, b: &str) -> (ChatService, ChatView) {
        h.user(a, Role::Seeker).await;
        h.user(b, Role::Provider).await;
        let service = h.chats();
        let chat = service.get_or_create_chat(a, b, None, None).await.unwrap();
        (service, chat)
    }

    #[tokio::test]
    async fn get_or_create_is_stable_for_either_order() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;
        let again = service.get_or_create_chat("bob", "amy", None, None).await.unwrap();
        assert_eq!(chat.id, again.id);
        assert_eq!(chat.participants.len(), 2);
        let names: Vec<_> = chat.participants.iter().map(|p| p.username.as_str()).collect();
        assert!(names.contains(&"amy") && names.contains(&"bob"));
    }

    #[tokio::test]
    async fn concurrent_creation_yields_one_chat() {
        let h = Harness::new();
        h.user("amy", Role::Seeker).await;
        h.user("bob", Role::Provider).await;
        let service = h.chats();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.get_or_create_chat("amy", "bob", None, None).await.unwrap().id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert!(service.creation_locks.is_empty());
    }

    #[tokio::test]
    async fn chat_with_self_or_unknown_user_fails() {
        let h = Harness::new();
        h.user("amy", Role::Seeker).await;
        let service = h.chats();
        assert!(matches!(
            service.get_or_create_chat("amy", "amy", None, None).await,
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            service.get_or_create_chat("amy", "ghost", None, None).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn send_persists_notifies_and_broadcasts() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;

        let sent = service
            .send_message(chat.id, "amy", Some("  hello  ".to_string()), None)
            .await
            .unwrap();
        assert_eq!(sent.content.as_deref(), Some("hello"));
        assert_eq!(sent.sender.username, "amy");
        assert_eq!(sent.read_by, vec![sent.sender.id]);

        let room = h.broadcaster.events_for(&chat.id.to_string());
        assert_eq!(room.len(), 1);
        assert_eq!(room[0].0, events::NEW_MESSAGE);
        assert_eq!(room[0].1["sender"]["username"], "amy");

        let notes = h.notifications().list("bob").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Message);

        let listed = service.list_chats("bob").await.unwrap();
        assert!(listed[0].last_message_at >= chat.last_message_at);
    }

    #[tokio::test]
    async fn attachment_only_message_is_valid_but_empty_is_not() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;

        let file = h.storage.save("cv.pdf", None, b"x").await.unwrap();
        let sent = service
            .send_message(chat.id, "amy", None, Some(file.into()))
            .await
            .unwrap();
        assert!(sent.content.is_none());
        assert_eq!(sent.file_name.as_deref(), Some("cv.pdf"));

        let err = service
            .send_message(chat.id, "amy", Some("   ".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn outsiders_and_missing_chats_are_refused() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;
        h.user("eve", Role::Seeker).await;

        assert!(matches!(
            service.send_message(chat.id, "eve", Some("hi".into()), None).await,
            Err(Error::InvalidSender(_))
        ));
        assert!(matches!(
            service.send_message(chat.id, "nobody", Some("hi".into()), None).await,
            Err(Error::InvalidSender(_))
        ));
        assert!(matches!(
            service.send_message(Uuid::new_v4(), "amy", Some("hi".into()), None).await,
            Err(Error::NotFound(_))
        ));
        assert!(service.list_messages(chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blocks_suppress_delivery_in_both_directions() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "cara").await;
        h.store.insert_block("amy", "cara").await.unwrap();

        let file = h.storage.save("photo.png", None, b"png").await.unwrap();
        let path = h.storage.path_for(&file.url);
        let err = service
            .send_message(chat.id, "cara", Some("hi".into()), Some(file.into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeliveryBlocked));
        assert!(!path.exists());

        let err = service
            .send_message(chat.id, "amy", Some("hi".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeliveryBlocked));

        assert!(service.list_messages(chat.id).await.unwrap().is_empty());
        assert_eq!(h.broadcaster.count(events::NEW_MESSAGE), 0);
        assert!(h.notifications().list("amy").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_sender_can_edit_or_delete() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;
        let sent = service
            .send_message(chat.id, "amy", Some("original".into()), None)
            .await
            .unwrap();

        assert!(matches!(
            service.edit_message(sent.id, "bob", "hacked").await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            service.delete_message(sent.id, "bob").await,
            Err(Error::Forbidden(_))
        ));
        let stored = service.list_messages(chat.id).await.unwrap();
        assert_eq!(stored[0].content.as_deref(), Some("original"));
        assert!(!stored[0].edited);

        let edited = service.edit_message(sent.id, "amy", "fixed").await.unwrap();
        assert!(edited.edited);
        assert_eq!(edited.content.as_deref(), Some("fixed"));
        assert_eq!(h.broadcaster.count(events::MESSAGE_EDITED), 1);

        service.delete_message(sent.id, "amy").await.unwrap();
        assert!(service.list_messages(chat.id).await.unwrap().is_empty());
        let deleted = h.broadcaster.events_for(&chat.id.to_string());
        let (event, payload) = deleted.last().unwrap();
        assert_eq!(*event, events::MESSAGE_DELETED);
        assert_eq!(payload["messageId"], sent.id.to_string());

        assert!(matches!(
            service.delete_message(sent.id, "amy").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_edit_is_rejected() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;
        let sent = service
            .send_message(chat.id, "amy", Some("hi".into()), None)
            .await
            .unwrap();
        assert!(matches!(
            service.edit_message(sent.id, "amy", "  ").await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn mark_read_updates_other_side_only() {
        let h = Harness::new();
        let (service, chat) = chat_between(&h, "amy", "bob").await;
        service.send_message(chat.id, "amy", Some("one".into()), None).await.unwrap();
        service.send_message(chat.id, "amy", Some("two".into()), None).await.unwrap();

        assert_eq!(service.mark_read(chat.id, "amy").await.unwrap(), 0);
        assert_eq!(service.mark_read(chat.id, "bob").await.unwrap(), 2);
        assert_eq!(service.mark_read(chat.id, "bob").await.unwrap(), 0);
        assert_eq!(h.broadcaster.count(events::MESSAGES_READ), 1);

        let messages = service.list_messages(chat.id).await.unwrap();
        assert!(messages.iter().all(|m| m.read_by.len() == 2));
    }

    #[tokio::test]
    async fn typing_event_carries_chat_and_user() {
        let h = Harness::new();
        let event = h.chats().mark_typing("c1", "amy");
        assert_eq!(event["chatId"], "c1");
        assert_eq!(event["username"], "amy");
        assert!(event["at"].is_string());
    }
}
