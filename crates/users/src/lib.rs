//! User records and their permission sets.
//!
//! The router reads users through the [`UserStore`] trait; permission-changing
//! commands mutate a [`User`] and persist it with [`UserStore::update_user`].

pub mod error;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod user;

pub use {
    error::{Error, Result},
    store::{UserStore, get_or_create},
    store_memory::InMemoryUserStore,
    store_sqlite::SqliteUserStore,
    user::{HELLO_PERMISSION, User},
};
