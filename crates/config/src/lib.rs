//! Configuration loading, validation and env substitution.
//!
//! Config files: `graceless.toml`, `graceless.yaml`, or `graceless.json`
//! Searched in `./` then `~/.config/graceless/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{discover_and_load, load_config},
    schema::{
        BotConfig, DEFAULT_COMMAND_PREFIX, DatabaseConfig, EnginesConfig, GracelessConfig,
        IntroConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
