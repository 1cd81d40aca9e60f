use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    CommandContext, CommandHandler, Result,
    descriptor::{Category, CommandDescriptor},
    handler::strip_command,
    settings::Settings,
};

/// `safemode [true|false]`: toggle or report the current mode.
pub struct Safemode {
    settings: Arc<Settings>,
}

impl Safemode {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::hidden(Category::Generic).with_permissions(["safemode"])
    }
}

#[async_trait]
impl CommandHandler for Safemode {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &["safemode"]).map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        match ctx.args.as_str() {
            "true" => {
                self.settings.set_safemode(true);
            },
            "false" => {
                self.settings.set_safemode(false);
            },
            _ => {},
        }
        ctx.reply(&format!("safemode: {}", self.settings.is_safemode()))
            .await
    }
}
