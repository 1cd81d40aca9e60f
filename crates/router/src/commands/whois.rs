use async_trait::async_trait;

use crate::{
    CommandContext, CommandHandler, Result,
    descriptor::{Category, CommandDescriptor},
    handler::strip_command,
};

const USAGE: &str = "Usage: whois <@user>";

/// `whois <@user>`: DM the caller what the platform knows about a user.
pub struct Whois;

impl Whois {
    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("whois", Category::Generic)
    }
}

/// Reduce a mention such as `<@U123>` or `<@U123|alice>` to the bare ID.
fn mention_id(mention: &str) -> &str {
    let id = mention.strip_prefix("<@").unwrap_or(mention);
    let id = id.strip_suffix('>').unwrap_or(id);
    id.split('|').next().unwrap_or(id)
}

#[async_trait]
impl CommandHandler for Whois {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &["whois"]).map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        if ctx.args.is_empty() || ctx.args.contains(char::is_whitespace) {
            return ctx.reply(USAGE).await;
        }

        let user = ctx.transport.get_user(mention_id(&ctx.args)).await?;
        let json = serde_json::to_string_pretty(&user)?;
        ctx.reply_direct(&format!("```{json}```")).await
    }

    fn help_short(&self) -> &str {
        "whois : get a user's ID"
    }

    fn help_long(&self) -> &str {
        USAGE
    }
}
