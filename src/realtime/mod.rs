pub mod handlers;

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use socketioxide::SocketIo;

pub mod events {
    pub const NEW_MESSAGE: &str = "newMessage";
    pub const MESSAGE_EDITED: &str = "messageEdited";
    pub const MESSAGE_DELETED: &str = "messageDeleted";
    pub const MESSAGES_READ: &str = "messagesRead";
    pub const TYPING: &str = "typing";
    pub const NOTIFICATION: &str = "notification";
}

/// Personal room joined by every socket that registered as `username`.
pub fn user_room(username: &str) -> String {
    format!("user:{username}")
}

/// Fan-out seam between services and the socket transport. Delivery is
/// fire-and-forget: a dropped emit never fails the request that caused it.
pub trait Broadcaster: Send + Sync {
    fn emit(&self, room: &str, event: &'static str, payload: &Value);
}

#[derive(Clone)]
pub struct SocketBroadcaster {
    io: SocketIo,
}

impl SocketBroadcaster {
    pub fn new(io: SocketIo) -> Self {
        Self { io }
    }
}

impl Broadcaster for SocketBroadcaster {
    fn emit(&self, room: &str, event: &'static str, payload: &Value) {
        if let Err(e) = self.io.to(room.to_string()).emit(event, payload) {
            tracing::warn!(error = %e, room = %room, event = event, "broadcast dropped");
        }
    }
}

/// Which usernames currently hold at least one registered socket.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<String, HashSet<String>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, username: &str, socket_id: &str) {
        self.inner
            .entry(username.to_string())
            .or_default()
            .insert(socket_id.to_string());
    }

    pub fn unregister(&self, username: &str, socket_id: &str) {
        let empty = match self.inner.get_mut(username) {
            Some(mut sockets) => {
                sockets.remove(socket_id);
                sockets.is_empty()
            }
            None => false,
        };
        if empty {
            self.inner.remove_if(username, |_, sockets| sockets.is_empty());
        }
    }

    pub fn is_online(&self, username: &str) -> bool {
        self.inner.get(username).map_or(false, |s| !s.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Captures emits so tests can assert on room fan-out.
    #[derive(Default)]
    pub struct RecordingBroadcaster {
        pub sent: Mutex<Vec<(String, &'static str, Value)>>,
    }

    impl RecordingBroadcaster {
        pub fn events_for(&self, room: &str) -> Vec<(&'static str, Value)> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(r, _, _)| r == room)
                .map(|(_, e, p)| (*e, p.clone()))
                .collect()
        }

        pub fn count(&self, event: &str) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, e, _)| *e == event)
                .count()
        }
    }

    impl Broadcaster for RecordingBroadcaster {
        fn emit(&self, room: &str, event: &'static str, payload: &Value) {
            self.sent
                .lock()
                .unwrap()
                .push((room.to_string(), event, payload.clone()));
        }
    }
}
