//! `sed '<script>' <input>`: pipe text through the system `sed`.

use std::path::PathBuf;

use {async_trait::async_trait, tokio::process::Command};

use crate::{
    CommandContext, CommandHandler, Result,
    commands::process::{self, DEFAULT_TIMEOUT},
    descriptor::{Category, CommandDescriptor},
    handler::strip_command,
};

const USAGE: &str = "Usage: sed '<sed command>' <input>";

pub struct Sed {
    binary: PathBuf,
}

impl Sed {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Locate `sed` on `PATH`.
    pub fn discover() -> Option<Self> {
        which::which("sed").ok().map(Self::new)
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("sed", Category::Generic)
    }

    /// `--sandbox` makes sed refuse the `e`, `r` and `w` commands.
    fn command(&self, script: &str) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(["--sandbox", "-e", script]);
        command
    }
}

/// Split `'<script>' <input>`. The script runs up to the last single quote
/// and there must be input after it.
fn parse_args(args: &str) -> Option<(&str, &str)> {
    let body = args.strip_prefix('\'')?;
    let end = body.rfind('\'')?;
    let script = &body[..end];
    let input = body[end + 1..].trim();
    (!input.is_empty()).then_some((script, input))
}

#[async_trait]
impl CommandHandler for Sed {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &["sed", "s"]).map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let Some((script, input)) = parse_args(&ctx.args) else {
            return ctx.reply(USAGE).await;
        };

        let output = process::run(
            self.command(script),
            Some(input.to_string()),
            DEFAULT_TIMEOUT,
        )
        .await?;

        if output.success {
            ctx.reply(&format!("```{}```", output.stdout)).await
        } else {
            ctx.reply(&output.stderr).await
        }
    }

    fn help_short(&self) -> &str {
        "sed : pass the following to sed"
    }

    fn help_long(&self) -> &str {
        USAGE
    }
}
