//! Process-wide mode read on every dispatch.

use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, Ordering},
};

use {graceless_config::BotConfig, tracing::info};

#[derive(Debug)]
pub struct Settings {
    prefix: String,
    root_users: HashSet<String>,
    ignore_users: Vec<String>,
    safemode: AtomicBool,
    has_store: bool,
}

impl Settings {
    /// Safemode starts on when requested or when there is no store.
    pub fn from_config(config: &BotConfig, has_store: bool) -> Self {
        Self {
            prefix: config.prefix.clone(),
            root_users: config.root_users.iter().cloned().collect(),
            ignore_users: config.ignore_users.clone(),
            safemode: AtomicBool::new(config.safemode || !has_store),
            has_store,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strict membership: an empty root list makes nobody root.
    pub fn is_root(&self, user_id: &str) -> bool {
        self.root_users.contains(user_id)
    }

    pub fn ignore_users(&self) -> &[String] {
        &self.ignore_users
    }

    pub fn is_safemode(&self) -> bool {
        self.safemode.load(Ordering::Acquire)
    }

    /// Returns the previous value.
    pub fn set_safemode(&self, enabled: bool) -> bool {
        let previous = self.safemode.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(safemode = enabled, "safemode changed");
        }
        previous
    }

    pub fn has_store(&self) -> bool {
        self.has_store
    }
}
