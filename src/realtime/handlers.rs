use serde_json::Value;
use socketioxide::extract::{Data, SocketRef};

use super::{events, user_room};
use crate::AppState;

/// Chat room the socket currently listens on. A socket follows one chat at a time.
#[derive(Debug, Clone)]
struct JoinedChat(String);

#[derive(Debug, Clone)]
struct RegisteredUser(String);

fn field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `join` accepts either the bare chat id or `{chatId, username}`.
fn join_target(payload: &Value) -> Option<(String, Option<String>)> {
    match payload {
        Value::String(s) if !s.trim().is_empty() => Some((s.trim().to_string(), None)),
        Value::Object(_) => field(payload, "chatId").map(|id| (id, field(payload, "username"))),
        _ => None,
    }
}

fn username_of(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => field(payload, "username"),
    }
}

pub async fn on_connect(socket: SocketRef, state: AppState) {
    tracing::debug!(sid = %socket.id, "socket connected");

    socket.on("join", {
        let state = state.clone();
        move |socket: SocketRef, Data::<Value>(payload)| {
            let state = state.clone();
            async move { on_join(socket, payload, &state) }
        }
    });

    socket.on("register", {
        let state = state.clone();
        move |socket: SocketRef, Data::<Value>(payload)| {
            let state = state.clone();
            async move { on_register(socket, payload, &state) }
        }
    });

    socket.on("typing", {
        let state = state.clone();
        move |socket: SocketRef, Data::<Value>(payload)| {
            let state = state.clone();
            async move { on_typing(socket, payload, &state) }
        }
    });

    socket.on_disconnect({
        let state = state.clone();
        move |socket: SocketRef| {
            let state = state.clone();
            async move { on_disconnect(socket, &state) }
        }
    });
}

fn on_join(socket: SocketRef, payload: Value, state: &AppState) {
    let Some((chat_id, username)) = join_target(&payload) else {
        tracing::warn!(sid = %socket.id, "join without chat id");
        return;
    };

    if let Some(JoinedChat(previous)) = socket.extensions.get::<JoinedChat>() {
        if previous != chat_id {
            socket.leave(previous).ok();
        }
    }
    socket.join(chat_id.clone()).ok();
    socket.extensions.insert(JoinedChat(chat_id.clone()));

    if let Some(username) = username {
        register_connection(&socket, &username, state);
    }

    tracing::debug!(sid = %socket.id, chat_id = %chat_id, "joined chat room");
}

fn on_register(socket: SocketRef, payload: Value, state: &AppState) {
    match username_of(&payload) {
        Some(username) => register_connection(&socket, &username, state),
        None => tracing::warn!(sid = %socket.id, "register without username"),
    }
}

fn register_connection(socket: &SocketRef, username: &str, state: &AppState) {
    let sid = socket.id.to_string();
    if let Some(RegisteredUser(previous)) = socket.extensions.get::<RegisteredUser>() {
        if previous == username {
            return;
        }
        state.registry.unregister(&previous, &sid);
        socket.leave(user_room(&previous)).ok();
    }
    socket.join(user_room(username)).ok();
    socket.extensions.insert(RegisteredUser(username.to_string()));
    state.registry.register(username, &sid);
    tracing::info!(sid = %sid, username = %username, "socket registered");
}

fn on_typing(socket: SocketRef, payload: Value, state: &AppState) {
    let (Some(chat_id), Some(username)) = (field(&payload, "chatId"), field(&payload, "username")) else {
        return;
    };
    let event = state.chat_service.mark_typing(&chat_id, &username);
    socket.to(chat_id).emit(events::TYPING, &event).ok();
}

fn on_disconnect(socket: SocketRef, state: &AppState) {
    if let Some(RegisteredUser(username)) = socket.extensions.get::<RegisteredUser>() {
        state.registry.unregister(&username, &socket.id.to_string());
        tracing::info!(sid = %socket.id, username = %username, "socket disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_accepts_bare_id_and_object() {
        assert_eq!(join_target(&json!("c1")), Some(("c1".to_string(), None)));
        assert_eq!(
            join_target(&json!({"chatId": "c2", "username": "amy"})),
            Some(("c2".to_string(), Some("amy".to_string())))
        );
        assert_eq!(join_target(&json!({"username": "amy"})), None);
        assert_eq!(join_target(&json!("  ")), None);
    }

    #[test]
    fn register_accepts_bare_name_and_object() {
        assert_eq!(username_of(&json!("amy")), Some("amy".to_string()));
        assert_eq!(username_of(&json!({"username": "bob"})), Some("bob".to_string()));
        assert_eq!(username_of(&json!(42)), None);
    }
}
