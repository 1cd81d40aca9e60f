use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Permission recorded once a user has received the introduction message.
pub const HELLO_PERMISSION: &str = "hello";

/// A stored user and the permissions granted to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    permissions: BTreeSet<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            permissions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Set containment: true when every entry of `required` is granted.
    /// An empty `required` is always satisfied.
    pub fn has_all<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required
            .iter()
            .all(|p| self.permissions.contains(p.as_ref()))
    }

    /// Returns `false` when the permission was already present.
    pub fn add_permission(&mut self, permission: impl Into<String>) -> bool {
        self.permissions.insert(permission.into())
    }

    /// Returns `false` when the permission was not present.
    pub fn remove_permission(&mut self, permission: &str) -> bool {
        self.permissions.remove(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_order_independent() {
        let user = User::new("U1").with_permissions(["perms", "chat", "go"]);
        assert!(user.has_all(&["go", "perms"]));
        assert!(user.has_all(&["perms", "go"]));
        assert!(!user.has_all(&["perms", "shutdown"]));
        assert!(user.has_all::<&str>(&[]));
    }

    #[test]
    fn add_and_remove_report_change() {
        let mut user = User::new("U1");
        assert!(user.add_permission("chat"));
        assert!(!user.add_permission("chat"));
        assert!(user.has_permission("chat"));
        assert!(user.remove_permission("chat"));
        assert!(!user.remove_permission("chat"));
        assert!(user.permissions().is_empty());
    }

    #[test]
    fn permissions_survive_json() {
        let user = User::new("U1")
            .with_name("alice")
            .with_permissions(["b", "a"]);
        let json = serde_json::to_string(&user).unwrap_or_default();
        assert_eq!(json, r#"{"id":"U1","name":"alice","permissions":["a","b"]}"#);
    }
}
