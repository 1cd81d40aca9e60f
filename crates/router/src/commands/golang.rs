//! Runs fenced `package main` snippets with `go run`.
//!
//! There is no sandbox beyond the import allowlist and a timeout.

use std::{io::Write, path::PathBuf};

use {async_trait::async_trait, tokio::process::Command, tracing::debug};

use crate::{
    CommandContext, CommandHandler, Result,
    commands::process::{self, DEFAULT_TIMEOUT},
    descriptor::{Category, CommandDescriptor},
    error::Context,
};

const FENCE: &str = "```";

pub struct GoEngine {
    binary: PathBuf,
    allowed_imports: Vec<String>,
}

impl GoEngine {
    pub fn new(binary: impl Into<PathBuf>, allowed_imports: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            allowed_imports,
        }
    }

    /// Use `binary` when given, otherwise look `go` up on `PATH`.
    pub fn discover(binary: Option<PathBuf>, allowed_imports: Vec<String>) -> Option<Self> {
        let binary = binary.or_else(|| which::which("go").ok())?;
        Some(Self::new(binary, allowed_imports))
    }

    pub fn descriptor() -> CommandDescriptor {
        CommandDescriptor::hidden(Category::Engine)
            .with_permissions(["go"])
            .with_safemode_disallowed()
    }
}

/// Import paths declared by `source`, in order. Handles single-line imports,
/// grouped `import ( ... )` blocks and aliased imports.
fn imports(source: &str) -> Vec<&str> {
    fn path(spec: &str) -> Option<&str> {
        let quoted = spec.split_whitespace().last()?;
        quoted
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| quoted.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
    }

    let mut found = Vec::new();
    let mut in_block = false;
    for line in source.lines().map(str::trim) {
        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(p) = path(line) {
                found.push(p);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("import") {
            let rest = rest.trim();
            if rest.starts_with('(') {
                in_block = true;
            } else if let Some(p) = path(rest) {
                found.push(p);
            }
        }
    }
    found
}

impl GoEngine {
    /// First import outside the allowlist, if any.
    fn illegal_import<'a>(&self, source: &'a str) -> Option<&'a str> {
        imports(source)
            .into_iter()
            .find(|p| !self.allowed_imports.iter().any(|a| a == p))
    }
}

#[async_trait]
impl CommandHandler for GoEngine {
    fn match_command(&self, text: &str) -> Option<String> {
        let body = text
            .trim()
            .strip_prefix(FENCE)?
            .strip_suffix(FENCE)?
            .trim();
        body.starts_with("package main").then(|| body.to_string())
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        if let Some(import) = self.illegal_import(&ctx.args) {
            debug!(import, "rejected go snippet");
            return ctx.reply(&format!("illegal import: {import}")).await;
        }

        let mut file = tempfile::Builder::new()
            .prefix("graceless_")
            .suffix(".go")
            .tempfile()
            .context("creating go source file")?;
        file.write_all(ctx.args.as_bytes())
            .and_then(|()| file.flush())
            .context("writing go source file")?;

        let mut command = Command::new(&self.binary);
        command.arg("run").arg(file.path());
        let output = process::run(command, None, DEFAULT_TIMEOUT).await?;
        drop(file);

        if output.success {
            ctx.reply(&format!("{FENCE}{}{FENCE}", output.stdout)).await
        } else {
            ctx.reply(&output.stderr).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GoEngine {
        GoEngine::new("go", vec!["fmt".into(), "strings".into(), "math/rand".into()])
    }

    #[test]
    fn matches_fenced_main_package() {
        let text = "```package main\n\nfunc main() {}\n```";
        assert_eq!(
            engine().match_command(text).as_deref(),
            Some("package main\n\nfunc main() {}")
        );
        assert!(engine().match_command("```package foo```").is_none());
        assert!(engine().match_command("package main").is_none());
        assert!(engine().match_command("```").is_none());
    }

    #[test]
    fn collects_every_import_form() {
        let src = r#"package main

import "fmt"
import r "math/rand"
import (
    "strings"
    o "os"
)
"#;
        assert_eq!(imports(src), vec!["fmt", "math/rand", "strings", "os"]);
    }

    #[test]
    fn rejects_imports_outside_allowlist() {
        let src = "package main\nimport (\n\"fmt\"\n\"os/exec\"\n)\n";
        assert_eq!(engine().illegal_import(src), Some("os/exec"));
        assert_eq!(engine().illegal_import("package main\nimport \"fmt\"\n"), None);
    }

    #[test]
    fn descriptor_is_hidden_engine() {
        let d = GoEngine::descriptor();
        assert!(d.is_hidden());
        assert_eq!(d.category(), Category::Engine);
        assert!(d.disallowed_in_safemode());
    }
}
