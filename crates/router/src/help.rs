//! `help` and `help <command>` responses.

use {graceless_channels::ChatUser, graceless_users::User};

use crate::{
    descriptor::Category,
    gate::pre_check,
    handler::strip_command,
    registry::{CommandRegistry, RegisteredCommand},
    settings::Settings,
};

/// What a prefixed message asked of the help subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpRequest<'a> {
    /// Bare `help`: list everything the caller may run.
    Listing,
    /// `help <topic>`: long help for a single command.
    Topic(&'a str),
}

/// Recognise `help` and `help <topic>`. Anything else is not a help request.
pub fn help_request(text: &str) -> Option<HelpRequest<'_>> {
    let rest = strip_command(text, &["help"])?;
    if rest.is_empty() {
        Some(HelpRequest::Listing)
    } else {
        Some(HelpRequest::Topic(rest))
    }
}

/// Visible, gate-passing commands in help order.
fn visible<'a>(
    registry: &'a CommandRegistry,
    sender: &'a ChatUser,
    user: &'a User,
    settings: &'a Settings,
) -> impl Iterator<Item = RegisteredCommand> + 'a {
    Category::HELP_ORDER
        .into_iter()
        .flat_map(move |category| registry.lookup(category))
        .filter(move |command| {
            !command.descriptor.is_hidden()
                && pre_check(&command.descriptor, sender, user, settings).is_ok()
        })
}

/// Short help of every visible command the caller may run, one per line.
/// `None` when there is nothing to show.
pub fn short_help(
    registry: &CommandRegistry,
    sender: &ChatUser,
    user: &User,
    settings: &Settings,
) -> Option<String> {
    let lines: Vec<String> = visible(registry, sender, user, settings)
        .map(|command| command.handler.help_short().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Long help of the first visible command named `topic` or matching it.
pub fn long_help(
    registry: &CommandRegistry,
    topic: &str,
    sender: &ChatUser,
    user: &User,
    settings: &Settings,
) -> Option<String> {
    visible(registry, sender, user, settings)
        .find(|command| {
            command.descriptor.name().eq_ignore_ascii_case(topic)
                || command.handler.match_command(topic).is_some()
        })
        .map(|command| command.handler.help_long().trim().to_string())
        .filter(|text| !text.is_empty())
}
