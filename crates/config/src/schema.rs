/// Config schema types (bot, database, intro, engines).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default command prefix.
pub const DEFAULT_COMMAND_PREFIX: &str = ".";

/// Where the `source` command points people.
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/justanotherorganization/graceless";

const DEFAULT_INTRO_START: &str = "Hi! I just wanted to introduce myself, I'm a graceless chat bot.";

const DEFAULT_INTRO_FINISH: &str = "If you want to know what they are just type [tag][prefix]help[tag] in any channel
and I'll respond to you here.

Lastly, just to warn you, I'm really clumsy!!!";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GracelessConfig {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub intro: IntroConfig,
    pub engines: EnginesConfig,
}

impl GracelessConfig {
    /// Safemode is forced on whenever no persistent store is configured.
    pub fn effective_safemode(&self) -> bool {
        self.bot.safemode || self.database.path.is_none()
    }
}

/// Command routing and access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Prefix a message must start with to be treated as a command.
    pub prefix: String,
    /// User IDs that pass every permission check.
    pub root_users: Vec<String>,
    /// Service or bot accounts whose messages never run commands.
    /// Supports `*` wildcards, matched case-insensitively.
    pub ignore_users: Vec<String>,
    /// Start in safemode even when a database is configured.
    pub safemode: bool,
    /// URL replied by the `source` command.
    pub source_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_COMMAND_PREFIX.into(),
            root_users: Vec::new(),
            ignore_users: Vec::new(),
            safemode: false,
            source_url: DEFAULT_SOURCE_URL.into(),
        }
    }
}

/// Persistent user store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding users and their permissions.
    pub path: Option<PathBuf>,
}

/// First-contact introduction message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub enabled: bool,
    pub start: String,
    /// `[tag]` becomes a backtick and `[prefix]` the command prefix.
    pub finish: String,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start: DEFAULT_INTRO_START.into(),
            finish: DEFAULT_INTRO_FINISH.into(),
        }
    }
}

/// Optional snippet engines and subprocess-backed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginesConfig {
    /// Register `sed` when a binary is found on `PATH`.
    pub sed: bool,
    /// Run fenced `package main` snippets with the Go toolchain.
    /// Highly experimental and unsandboxed.
    pub go: bool,
    /// Explicit path to the `go` binary; looked up on `PATH` when unset.
    pub go_binary: Option<PathBuf>,
    /// Import paths a Go snippet may use.
    pub go_imports: Vec<String>,
    /// Evaluate fenced `js` snippets in an embedded interpreter.
    pub js: bool,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            sed: true,
            go: false,
            go_binary: None,
            go_imports: default_go_imports(),
            js: false,
        }
    }
}

fn default_go_imports() -> Vec<String> {
    [
        "bytes",
        "fmt",
        "log",
        "math",
        "math/big",
        "math/cmplx",
        "math/rand",
        "strings",
        "time",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_force_safemode_without_database() {
        let cfg = GracelessConfig::default();
        assert_eq!(cfg.bot.prefix, ".");
        assert!(cfg.effective_safemode());
    }

    #[test]
    fn database_lifts_safemode_unless_requested() {
        let mut cfg = GracelessConfig::default();
        cfg.database.path = Some("users.db".into());
        assert!(!cfg.effective_safemode());
        cfg.bot.safemode = true;
        assert!(cfg.effective_safemode());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: GracelessConfig = toml::from_str(
            r#"
            [bot]
            root_users = ["U1"]

            [engines]
            go = true
            js = true
            "#,
        )
        .unwrap_or_default();
        assert_eq!(cfg.bot.root_users, vec!["U1".to_string()]);
        assert_eq!(cfg.bot.prefix, ".");
        assert!(cfg.engines.go);
        assert!(cfg.engines.js);
        assert!(cfg.engines.sed);
        assert!(cfg.engines.go_imports.contains(&"fmt".to_string()));
        assert!(cfg.intro.enabled);
    }
}
