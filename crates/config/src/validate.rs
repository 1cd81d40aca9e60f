//! Semantic checks on a loaded configuration.

use std::fmt;

use crate::schema::GracelessConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "bot.prefix"
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a configuration.
pub fn validate(config: &GracelessConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let prefix = &config.bot.prefix;
    if prefix.is_empty() {
        result.push(Severity::Error, "bot.prefix", "command prefix must not be empty");
    } else if prefix.chars().any(char::is_whitespace) {
        result.push(
            Severity::Error,
            "bot.prefix",
            format!("command prefix {prefix:?} must not contain whitespace"),
        );
    }

    for (i, id) in config.bot.root_users.iter().enumerate() {
        if id.trim().is_empty() {
            result.push(
                Severity::Error,
                format!("bot.root_users[{i}]"),
                "root user ID must not be empty",
            );
        }
    }

    for (i, pattern) in config.bot.ignore_users.iter().enumerate() {
        if pattern.trim().is_empty() {
            result.push(
                Severity::Error,
                format!("bot.ignore_users[{i}]"),
                "ignore pattern must not be empty",
            );
        } else if pattern.trim() == "*" {
            result.push(
                Severity::Warning,
                format!("bot.ignore_users[{i}]"),
                "\"*\" ignores every sender, no command will ever run",
            );
        }
    }

    if config.engines.go {
        result.push(
            Severity::Warning,
            "engines.go",
            "the Go engine runs user code without a sandbox",
        );
        if config.engines.go_imports.is_empty() {
            result.push(
                Severity::Warning,
                "engines.go_imports",
                "empty import allowlist, only import-free programs will run",
            );
        }
    }

    if config.database.path.is_none() && !config.bot.safemode {
        result.push(
            Severity::Warning,
            "database.path",
            "no database configured, starting in safemode",
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_only_warn_about_safemode() {
        let result = validate(&GracelessConfig::default());
        assert!(!result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].path, "database.path");
    }

    #[test]
    fn empty_prefix_is_an_error() {
        let mut cfg = GracelessConfig::default();
        cfg.bot.prefix = String::new();
        assert!(validate(&cfg).has_errors());
    }

    #[test]
    fn whitespace_prefix_is_an_error() {
        let mut cfg = GracelessConfig::default();
        cfg.bot.prefix = "! ".into();
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert!(result.diagnostics[0].to_string().starts_with("error [bot.prefix]"));
    }

    #[test]
    fn blank_root_user_is_an_error() {
        let mut cfg = GracelessConfig::default();
        cfg.bot.root_users = vec!["U1".into(), "  ".into()];
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "bot.root_users[1]")
        );
    }

    #[test]
    fn go_engine_warns() {
        let mut cfg = GracelessConfig::default();
        cfg.engines.go = true;
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert!(result.diagnostics.iter().any(|d| d.path == "engines.go"));
    }
}
