//! Built-in commands registered by [`crate::RouterBuilder`].

pub mod golang;
pub mod js;
pub mod perms;
pub mod process;
pub mod safemode;
pub mod sed;
pub mod shutdown;
pub mod source;
pub mod whois;

pub use {
    golang::GoEngine,
    js::JsEngine,
    perms::{AddPermission, DelPermission, GetPermissions},
    safemode::Safemode,
    sed::Sed,
    shutdown::Shutdown,
    source::Source,
    whois::Whois,
};
