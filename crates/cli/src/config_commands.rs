use std::path::Path;

use {
    anyhow::Result,
    clap::Subcommand,
    graceless_config::{GracelessConfig, Severity, validate},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration and report errors and warnings.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn handle_config(action: ConfigAction, config: &GracelessConfig, source: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Check => check(config, source),
        ConfigAction::Show => {
            println!("{}", toml_string(config)?);
            Ok(())
        },
    }
}

fn toml_string(config: &GracelessConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config: &GracelessConfig, source: Option<&Path>) -> Result<()> {
    match source {
        Some(path) => eprintln!("Checking {}\n", path.display()),
        None => eprintln!("Checking discovered configuration (or defaults).\n"),
    }

    let result = validate(config);
    for d in &result.diagnostics {
        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        };
        eprintln!("  {BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message);
    }

    let errors = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = result.diagnostics.len() - errors;

    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if result.has_errors() {
        anyhow::bail!("configuration has errors");
    }
    Ok(())
}
