//! Shared error definitions and the process-wide error channel used by every
//! graceless crate.

pub mod error;
pub mod report;

pub use {
    error::{Error, FromMessage, Result},
    report::{ErrorReceiver, ErrorSender, error_channel},
};
