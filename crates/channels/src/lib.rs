//! Chat transport contract.
//!
//! A transport (Slack, console, ...) streams inbound [`ChatEvent`]s to the
//! router and delivers replies. The router only ever talks to the
//! [`Transport`] trait.

pub mod error;
pub mod gating;
pub mod transport;

pub use {
    error::{Error, Result},
    transport::{ChatEvent, ChatUser, Transport},
};
