//! Persistence trait for users.

use {async_trait::async_trait, tracing::debug};

use crate::{Result, user::User};

/// Persistence backend for users and their permissions.
///
/// Stores own their consistency; callers doing get-then-update must not
/// assume the pair is atomic.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Insert `user`. Creating an ID that already exists is not an error: the
    /// stored record is returned unchanged.
    async fn create_user(&self, user: User) -> Result<User>;

    /// Replace an existing user. Fails with `UserNotFound` if absent.
    async fn update_user(&self, user: User) -> Result<User>;

    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Fetch a user, creating an empty record on first contact.
///
/// Two events for the same new user may race here; because `create_user` is
/// idempotent both end up with the same stored record.
pub async fn get_or_create(
    store: &dyn UserStore,
    id: &str,
    name: Option<&str>,
) -> Result<User> {
    if let Some(user) = store.get_user(id).await? {
        return Ok(user);
    }

    debug!(user_id = id, "first contact, creating user");
    let mut user = User::new(id);
    user.name = name.map(str::to_string);
    store.create_user(user).await
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::InMemoryUserStore};

    #[tokio::test]
    async fn get_or_create_creates_once() {
        let store = InMemoryUserStore::new();
        let first = get_or_create(&store, "U1", Some("alice")).await.unwrap();
        assert_eq!(first.name.as_deref(), Some("alice"));

        let mut stored = first.clone();
        stored.add_permission("chat");
        store.update_user(stored).await.unwrap();

        let again = get_or_create(&store, "U1", Some("renamed")).await.unwrap();
        assert!(again.has_permission("chat"));
        assert_eq!(again.name.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn concurrent_first_contact_converges() {
        let store = std::sync::Arc::new(InMemoryUserStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                get_or_create(store.as_ref(), "U1", None).await.unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().id, "U1");
        }
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
