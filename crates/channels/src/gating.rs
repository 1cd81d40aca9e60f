//! Sender classification applied before any command may run.

use crate::transport::ChatUser;

/// Check if `id` matches any pattern in `patterns`.
///
/// An empty list matches nothing. Entries are matched case-insensitively and
/// support glob-style `*` wildcards.
pub fn is_listed(id: &str, patterns: &[String]) -> bool {
    let id_lower = id.to_lowercase();
    patterns.iter().any(|pattern| {
        let pat = pattern.to_lowercase();
        if pat.contains('*') {
            glob_match(&pat, &id_lower)
        } else {
            pat == id_lower
        }
    })
}

/// True when the sender is a bot or matches the configured ignore list by ID
/// or by name. Such senders never trigger commands, which also keeps the bot
/// from answering itself.
pub fn is_service_account(sender: &ChatUser, ignore_users: &[String]) -> bool {
    sender.is_bot
        || is_listed(&sender.id, ignore_users)
        || sender
            .name
            .as_deref()
            .is_some_and(|name| is_listed(name, ignore_users))
}

/// Simple glob matching supporting `*` as a wildcard for any sequence of chars.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        match text[pos..].find(part) {
            Some(idx) => {
                // First segment must match at start
                if i == 0 && idx != 0 {
                    return false;
                }
                pos += idx + part.len();
            },
            None => return false,
        }
    }
    // Last segment must match at end (unless pattern ends with *)
    if !parts.last().unwrap_or(&"").is_empty() {
        pos == text.len()
    } else {
        true
    }
}
