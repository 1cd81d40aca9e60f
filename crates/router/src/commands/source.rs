use async_trait::async_trait;

use crate::{
    CommandContext, CommandHandler, Result,
    descriptor::{Category, CommandDescriptor},
    handler::strip_command,
};

/// Replies with where the bot's source code lives.
pub struct Source {
    url: String,
}

impl Source {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("source", Category::Generic)
    }
}

#[async_trait]
impl CommandHandler for Source {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &["source"]).map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        ctx.reply(&self.url).await
    }

    fn help_short(&self) -> &str {
        "source : where to find my source code"
    }
}
