//! The command contract and the per-invocation context handed to handlers.

use std::sync::Arc;

use {
    async_trait::async_trait,
    graceless_channels::{ChatEvent, Transport},
    graceless_users::User,
};

use crate::Result;

/// Everything a handler needs to act on a matched message.
#[derive(Clone)]
pub struct CommandContext {
    /// Text left over after the handler's own keyword, trimmed.
    pub args: String,
    pub event: ChatEvent,
    /// The caller as resolved from the user store (empty when no store).
    pub user: User,
    pub transport: Arc<dyn Transport>,
}

impl CommandContext {
    /// Send `text` back to the conversation the command came from.
    pub async fn reply(&self, text: &str) -> Result<()> {
        self.transport
            .send_message(&self.event.origin, text)
            .await
            .map_err(Into::into)
    }

    /// Send `text` to the caller's direct conversation.
    pub async fn reply_direct(&self, text: &str) -> Result<()> {
        let conversation = self
            .transport
            .get_conversation(&self.event.sender.id)
            .await?;
        self.transport
            .send_message(&conversation, text)
            .await
            .map_err(Into::into)
    }
}

/// Executable behavior paired 1:1 with a [`crate::CommandDescriptor`].
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Returns the remainder when `text` (prefix already stripped) addresses
    /// this command, `None` otherwise.
    fn match_command(&self, text: &str) -> Option<String>;

    async fn execute(&self, ctx: CommandContext) -> Result<()>;

    /// One line for the `help` listing. Empty lines are omitted.
    fn help_short(&self) -> &str {
        ""
    }

    /// Detailed text for `help <command>`.
    fn help_long(&self) -> &str {
        ""
    }
}

/// Match `text` against any of `aliases` case-insensitively. An alias only
/// matches on a word boundary, so `sed` does not claim `sedan`.
/// Returns the trimmed remainder.
pub fn strip_command<'a>(text: &'a str, aliases: &[&str]) -> Option<&'a str> {
    let text = text.trim_start();
    aliases.iter().find_map(|alias| {
        let head = text.get(..alias.len())?;
        if !head.eq_ignore_ascii_case(alias) {
            return None;
        }
        let rest = &text[alias.len()..];
        match rest.chars().next() {
            None => Some(""),
            Some(c) if c.is_whitespace() => Some(rest.trim()),
            Some(_) => None,
        }
    })
}
