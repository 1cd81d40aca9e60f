//! First-contact introduction sent to new human users.

use {
    graceless_channels::Transport,
    graceless_config::IntroConfig,
    graceless_users::{HELLO_PERMISSION, User, UserStore},
    tracing::info,
};

use crate::Result;

#[derive(Debug, Clone)]
pub struct Intro {
    start: String,
    finish: String,
}

impl Intro {
    /// `None` when introductions are disabled.
    pub fn from_config(config: &IntroConfig, prefix: &str) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let finish = config
            .finish
            .replace("[tag]", "`")
            .replace("[prefix]", prefix);
        Some(Self {
            start: config.start.clone(),
            finish,
        })
    }

    /// Build the message for a bot that knows `command_count` commands.
    pub fn compose(&self, command_count: usize) -> String {
        let boast = match command_count {
            0..=10 => "Unfortunately I only know a few commands right now...",
            11..=20 => "I can do several things, I think you'll like...",
            21..=30 => "I can do a number of things to help with your day...",
            31..=40 => "I can do a lot a things, it's really cool just how many...",
            41..=50 => "I can do so many things, like you won't believe your eyes...",
            51..=100 => "I can do a great many things, it's totally amazing...",
            _ => "I can do way too many things, like seriously...",
        };
        format!("{}\n\n{boast}\n\n{}\n", self.start, self.finish)
    }

    /// Greet `user` in their direct conversation unless they already hold
    /// the `hello` permission, then record it. Returns whether a greeting
    /// was sent.
    pub async fn greet_if_new(
        &self,
        transport: &dyn Transport,
        store: &dyn UserStore,
        user: &mut User,
        command_count: usize,
    ) -> Result<bool> {
        if user.has_permission(HELLO_PERMISSION) {
            return Ok(false);
        }

        let conversation = transport.get_conversation(&user.id).await?;
        transport
            .send_message(&conversation, &self.compose(command_count))
            .await?;

        user.add_permission(HELLO_PERMISSION);
        *user = store.update_user(user.clone()).await?;
        info!(user_id = %user.id, "introduced to new user");
        Ok(true)
    }
}
