use {
    async_trait::async_trait,
    graceless_common::ErrorSender,
    serde::{Deserialize, Serialize},
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
};

use crate::Result;

/// A user as the chat platform knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: String,
    /// Handle / username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    /// Set for integrations and other bots.
    #[serde(default)]
    pub is_bot: bool,
}

impl ChatUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            real_name: None,
            is_bot: false,
        }
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Raw message text, command prefix included.
    pub body: String,
    /// Conversation the message arrived in; replies go here.
    pub origin: String,
    pub sender: ChatUser,
}

impl ChatEvent {
    pub fn new(origin: impl Into<String>, sender: ChatUser, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            origin: origin.into(),
            sender,
        }
    }
}

/// Core transport trait. Each messaging platform implements this.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport identifier (e.g. "slack", "console").
    fn id(&self) -> &str;

    /// Deliver `text` to a conversation or user.
    async fn send_message(&self, to: &str, text: &str) -> Result<()>;

    /// Look up a single user by platform ID.
    async fn get_user(&self, id: &str) -> Result<ChatUser>;

    /// List every user visible to the bot.
    async fn get_users(&self) -> Result<Vec<ChatUser>>;

    /// Resolve (opening if needed) the direct conversation with a user.
    async fn get_conversation(&self, user_id: &str) -> Result<String>;

    /// Stream inbound events into `events` until `cancel` fires or the
    /// platform stream ends. Non-fatal failures go to `errors`.
    async fn tunnel_events(
        &self,
        cancel: CancellationToken,
        events: mpsc::Sender<ChatEvent>,
        errors: ErrorSender,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_name() {
        let mut user = ChatUser::new("U1");
        assert_eq!(user.label(), "U1");
        user.name = Some("alice".into());
        assert_eq!(user.label(), "alice");
    }

    #[test]
    fn serializes_without_empty_fields() {
        let json = serde_json::to_value(ChatUser::new("U1")).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"id": "U1", "is_bot": false}));
    }
}
