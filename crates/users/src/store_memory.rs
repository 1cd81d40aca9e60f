//! In-memory store for tests and ephemeral runs.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;

use crate::{Error, Result, store::UserStore, user::User};

/// In-memory store backed by `HashMap`. Nothing survives a restart.
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the store, e.g. with an operator who may manage permissions.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(id).cloned())
    }

    async fn create_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        Ok(users.entry(user.id.clone()).or_insert(user).clone())
    }

    async fn update_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            },
            None => Err(Error::user_not_found(user.id)),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}
