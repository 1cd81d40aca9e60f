use {async_trait::async_trait, tokio_util::sync::CancellationToken, tracing::info};

use crate::{
    CommandContext, CommandHandler, Result,
    descriptor::{Category, CommandDescriptor},
};

/// Stops the router by cancelling the process-wide token.
pub struct Shutdown {
    cancel: CancellationToken,
}

impl Shutdown {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::hidden(Category::Generic).with_permissions(["shutdown"])
    }
}

#[async_trait]
impl CommandHandler for Shutdown {
    fn match_command(&self, text: &str) -> Option<String> {
        (text.trim() == "shutdown").then(String::new)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        info!(by = %ctx.event.sender.id, "shutdown requested");
        self.cancel.cancel();
        Ok(())
    }
}
