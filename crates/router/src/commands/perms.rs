//! `add perm`, `get perms` and `del perm`: manage stored permission sets.

use std::sync::Arc;

use {
    async_trait::async_trait,
    graceless_users::{User, UserStore},
    tracing::info,
};

use crate::{
    CommandContext, CommandHandler, Result,
    descriptor::{Category, CommandDescriptor},
    handler::strip_command,
};

/// Permission required to manage other users' permissions.
pub const PERMS_PERMISSION: &str = "perms";

const ADD_USAGE: &str = "Usage: add perm <user id> <perm>";
const GET_USAGE: &str = "Usage: get perms <user id>";
const DEL_USAGE: &str = "Usage: del perm <user id> <perm>";

fn perms_descriptor(name: &str, category: Category) -> CommandDescriptor {
    CommandDescriptor::new(name, category)
        .with_permissions([PERMS_PERMISSION])
        .with_database()
}

/// Split `<user id> <perm>`; anything else is a usage error.
fn user_and_perm(args: &str) -> Option<(&str, &str)> {
    let mut fields = args.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(user), Some(perm), None) => Some((user, perm)),
        _ => None,
    }
}

async fn load_target(store: &dyn UserStore, ctx: &CommandContext, id: &str) -> Result<Option<User>> {
    let user = store.get_user(id).await?;
    if user.is_none() {
        ctx.reply(&format!("User {id} not in database")).await?;
    }
    Ok(user)
}

pub struct AddPermission {
    store: Arc<dyn UserStore>,
}

impl AddPermission {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> CommandDescriptor {
        perms_descriptor("add perm", Category::Add)
    }
}

#[async_trait]
impl CommandHandler for AddPermission {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &["add permission", "add perm"]).map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let Some((id, perm)) = user_and_perm(&ctx.args) else {
            return ctx.reply(ADD_USAGE).await;
        };
        let Some(mut target) = load_target(self.store.as_ref(), &ctx, id).await? else {
            return Ok(());
        };

        target.add_permission(perm);
        self.store.update_user(target).await?;
        info!(by = %ctx.event.sender.id, user_id = id, permission = perm, "permission added");
        ctx.reply(&format!("Added {perm} to {id}")).await
    }

    fn help_short(&self) -> &str {
        "add perm : add permissions to a user"
    }

    fn help_long(&self) -> &str {
        ADD_USAGE
    }
}

pub struct GetPermissions {
    store: Arc<dyn UserStore>,
}

impl GetPermissions {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> CommandDescriptor {
        perms_descriptor("get perms", Category::Get)
    }
}

#[async_trait]
impl CommandHandler for GetPermissions {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &["get permissions", "get perms"]).map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let mut fields = ctx.args.split_whitespace();
        let (Some(id), None) = (fields.next(), fields.next()) else {
            return ctx.reply(GET_USAGE).await;
        };
        let Some(target) = load_target(self.store.as_ref(), &ctx, id).await? else {
            return Ok(());
        };

        let perms: Vec<&str> = target.permissions().iter().map(String::as_str).collect();
        ctx.reply(&format!("Permissions for {} : [{}]", target.id, perms.join(" ")))
            .await
    }

    fn help_short(&self) -> &str {
        "get perms : get permissions for a user"
    }

    fn help_long(&self) -> &str {
        GET_USAGE
    }
}

pub struct DelPermission {
    store: Arc<dyn UserStore>,
}

impl DelPermission {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> CommandDescriptor {
        perms_descriptor("del perm", Category::Del)
    }
}

#[async_trait]
impl CommandHandler for DelPermission {
    fn match_command(&self, text: &str) -> Option<String> {
        strip_command(text, &[
            "del perm",
            "delete perm",
            "rm perm",
            "remove perm",
            "del permission",
            "delete permission",
            "rm permission",
            "remove permission",
        ])
        .map(str::to_string)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let Some((id, perm)) = user_and_perm(&ctx.args) else {
            return ctx.reply(DEL_USAGE).await;
        };
        let Some(mut target) = load_target(self.store.as_ref(), &ctx, id).await? else {
            return Ok(());
        };

        if !target.remove_permission(perm) {
            return ctx.reply(&format!("{id} does not have {perm}")).await;
        }
        self.store.update_user(target).await?;
        info!(by = %ctx.event.sender.id, user_id = id, permission = perm, "permission removed");
        ctx.reply(&format!("Removed {perm} from {id}")).await
    }

    fn help_short(&self) -> &str {
        "del perm : delete permissions from a user"
    }

    fn help_long(&self) -> &str {
        DEL_USAGE
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("U1 chat", Some(("U1", "chat")))]
    #[case("  U1   chat ", Some(("U1", "chat")))]
    #[case("U1", None)]
    #[case("", None)]
    #[case("U1 chat extra", None)]
    fn parses_user_and_perm(#[case] args: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(user_and_perm(args), expected);
    }

    #[test]
    fn descriptors_require_perms_and_database() {
        for d in [
            AddPermission::descriptor(),
            GetPermissions::descriptor(),
            DelPermission::descriptor(),
        ] {
            assert_eq!(d.required_permissions(), [PERMS_PERMISSION.to_string()]);
            assert!(d.needs_database());
            assert!(!d.is_hidden());
        }
        assert_eq!(AddPermission::descriptor().category(), Category::Add);
        assert_eq!(GetPermissions::descriptor().category(), Category::Get);
        assert_eq!(DelPermission::descriptor().category(), Category::Del);
    }
}
