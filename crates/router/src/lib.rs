//! Command registry and dispatch engine.
//!
//! Commands are a [`CommandDescriptor`] (static metadata) paired with a
//! [`CommandHandler`] (behavior). The [`CommandRegistry`] partitions them by
//! [`Category`]; the [`Router`] resolves each inbound message to at most one
//! of them after the authorization gate in [`gate`] lets it through.

pub mod commands;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod handler;
pub mod help;
pub mod intro;
pub mod registry;
pub mod settings;

pub use {
    descriptor::{Category, CommandDescriptor, HIDDEN},
    dispatcher::{DispatchOutcome, Router, RouterBuilder},
    error::{Error, Result},
    gate::{GateRejection, pre_check},
    handler::{CommandContext, CommandHandler, strip_command},
    registry::{CommandId, CommandRegistry, RegisteredCommand},
    settings::Settings,
};
