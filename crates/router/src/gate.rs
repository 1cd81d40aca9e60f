use {
    graceless_channels::{ChatUser, gating},
    graceless_users::User,
};

use crate::{descriptor::CommandDescriptor, settings::Settings};

/// Decide whether `descriptor` may run for this caller.
///
/// Pure predicate: checks run in a fixed order and the first failure wins.
/// `sender` is the platform identity (for service-account detection), `user`
/// the stored record carrying permissions.
pub fn pre_check(
    descriptor: &CommandDescriptor,
    sender: &ChatUser,
    user: &User,
    settings: &Settings,
) -> Result<(), GateRejection> {
    if descriptor.is_disabled() {
        return Err(GateRejection::Disabled);
    }
    if gating::is_service_account(sender, settings.ignore_users()) {
        return Err(GateRejection::ServiceAccount);
    }
    if settings.is_safemode() && descriptor.disallowed_in_safemode() {
        return Err(GateRejection::Safemode);
    }
    if !settings.has_store() && descriptor.needs_database() {
        return Err(GateRejection::NoDatabase);
    }

    let required = descriptor.required_permissions();
    if required.is_empty() || settings.is_root(&sender.id) || user.has_all(required) {
        Ok(())
    } else {
        Err(GateRejection::MissingPermissions)
    }
}

/// Reason a candidate command was not allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    Disabled,
    ServiceAccount,
    Safemode,
    NoDatabase,
    MissingPermissions,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "command is disabled"),
            Self::ServiceAccount => write!(f, "sender is a service account"),
            Self::Safemode => write!(f, "command is not allowed in safemode"),
            Self::NoDatabase => write!(f, "command needs a database"),
            Self::MissingPermissions => write!(f, "missing permissions"),
        }
    }
}
