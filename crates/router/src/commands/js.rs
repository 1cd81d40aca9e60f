//! Evaluates fenced `js` snippets in an embedded interpreter.
//!
//! A snippet may set globals before the script runs and read others back
//! afterwards:
//!
//! ```text
//! in:
//! x: 2
//! out:
//! y
//! script:
//! var y = x * 21;
//! ```
//!
//! Without an `out:` section the value of the last expression is replied.

use {
    async_trait::async_trait,
    boa_engine::{Context, JsString, JsValue, Source, property::Attribute},
    tracing::debug,
};

use crate::{
    CommandContext, CommandHandler, Result,
    commands::process::DEFAULT_TIMEOUT,
    descriptor::{Category, CommandDescriptor},
    error::Context as _,
};

const FENCE: &str = "```";

/// Loop iterations a snippet may run before it is aborted.
pub const DEFAULT_LOOP_LIMIT: u64 = 1_000_000;

const RECURSION_LIMIT: usize = 256;

pub struct JsEngine {
    loop_limit: u64,
}

impl Default for JsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LOOP_LIMIT)
    }
}

impl JsEngine {
    pub fn new(loop_limit: u64) -> Self {
        Self { loop_limit }
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::hidden(Category::Engine).with_permissions(["js"])
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Input {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<Input> for JsValue {
    fn from(input: Input) -> Self {
        match input {
            Input::Bool(b) => Self::from(b),
            Input::Number(n) => Self::from(n),
            Input::Text(s) => Self::from(JsString::from(s.as_str())),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Snippet {
    inputs: Vec<(String, Input)>,
    outputs: Vec<String>,
    script: String,
}

enum Section {
    Script,
    In,
    Out,
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    ['`', '"', '\'']
        .into_iter()
        .find_map(|q| text.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)))
        .unwrap_or(text)
}

/// `name: value`. Lines with no colon or more than one are skipped.
fn parse_input(line: &str) -> Option<(String, Input)> {
    let (key, value) = line.split_once(':')?;
    if value.contains(':') {
        return None;
    }
    let value = unquote(value);
    let input = if let Ok(b) = value.parse::<bool>() {
        Input::Bool(b)
    } else if let Ok(n) = value.parse::<f64>() {
        Input::Number(n)
    } else {
        Input::Text(value.to_string())
    };
    Some((unquote(key).to_string(), input))
}

fn scan(body: &str) -> Snippet {
    let mut snippet = Snippet::default();
    let mut section = Section::Script;
    let mut script = Vec::new();

    for line in body.lines().map(str::trim_end) {
        match line {
            "in:" | "set:" => section = Section::In,
            "out:" | "get:" => section = Section::Out,
            "script:" => section = Section::Script,
            _ => match section {
                Section::In => snippet.inputs.extend(parse_input(line)),
                Section::Out if !line.trim().is_empty() => {
                    snippet.outputs.push(line.trim().to_string());
                },
                Section::Out => {},
                Section::Script => script.push(line),
            },
        }
    }

    snippet.script = script.join("\n").trim().to_string();
    snippet
}

/// Run `snippet` to completion. `Err` carries the script error as text.
fn evaluate(snippet: Snippet, loop_limit: u64) -> std::result::Result<String, String> {
    fn display(value: &JsValue, context: &mut Context) -> std::result::Result<String, String> {
        value
            .to_string(context)
            .map(|s| s.to_std_string_escaped())
            .map_err(|e| e.to_string())
    }

    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(loop_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(RECURSION_LIMIT);

    for (name, value) in snippet.inputs {
        context
            .register_global_property(
                JsString::from(name.as_str()),
                JsValue::from(value),
                Attribute::all(),
            )
            .map_err(|e| e.to_string())?;
    }

    let value = context
        .eval(Source::from_bytes(&snippet.script))
        .map_err(|e| e.to_string())?;

    if snippet.outputs.is_empty() {
        return Ok(format!("{FENCE}{}{FENCE}", display(&value, &mut context)?));
    }

    let global = context.global_object();
    let mut reply = String::new();
    for name in &snippet.outputs {
        let value = global
            .get(JsString::from(name.as_str()), &mut context)
            .map_err(|e| e.to_string())?;
        reply.push('\n');
        reply.push_str(FENCE);
        reply.push_str(&display(&value, &mut context)?);
        reply.push_str(FENCE);
    }
    Ok(reply)
}

#[async_trait]
impl CommandHandler for JsEngine {
    fn match_command(&self, text: &str) -> Option<String> {
        let body = text
            .trim()
            .strip_prefix(FENCE)?
            .strip_suffix(FENCE)?
            .trim()
            .strip_prefix("js")?;
        (body.is_empty() || body.starts_with(char::is_whitespace))
            .then(|| body.trim().to_string())
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let snippet = scan(&ctx.args);
        if snippet.script.is_empty() {
            return ctx.reply("No script provided").await;
        }

        let loop_limit = self.loop_limit;
        let task = tokio::task::spawn_blocking(move || evaluate(snippet, loop_limit));
        let outcome = tokio::time::timeout(DEFAULT_TIMEOUT, task)
            .await
            .context("js evaluation timed out")?
            .context("js evaluation task")?;

        match outcome {
            Ok(reply) => ctx.reply(&reply).await,
            Err(message) => {
                debug!(error = %message, "js snippet failed");
                ctx.reply(&message).await
            },
        }
    }
}
