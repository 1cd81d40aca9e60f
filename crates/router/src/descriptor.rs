//! Static metadata paired with every registered command.

use std::fmt;

/// Name given to commands that must never show up in help output.
pub const HIDDEN: &str = "hidden";

/// Registry partition a command lives in. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Catch-all, tried for every prefixed message.
    Generic,
    /// Messages starting with `add `.
    Add,
    /// Messages starting with `get `.
    Get,
    /// Messages starting with `del`, `delete`, `rm` or `remove`.
    Del,
    /// Unprefixed messages, e.g. fenced code run by a script engine.
    Engine,
}

impl Category {
    pub const COUNT: usize = 5;

    /// All variants, for iteration.
    pub const ALL: [Category; Self::COUNT] = [
        Self::Generic,
        Self::Add,
        Self::Get,
        Self::Del,
        Self::Engine,
    ];

    /// Order in which help output walks the prefixed partitions.
    pub const HELP_ORDER: [Category; 4] = [Self::Add, Self::Get, Self::Del, Self::Generic];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Generic => 0,
            Self::Add => 1,
            Self::Get => 2,
            Self::Del => 3,
            Self::Engine => 4,
        }
    }

    /// Pick the partition for a prefix-stripped command by testing literal
    /// prefixes in priority order. Anything else is [`Category::Generic`].
    pub fn for_command(text: &str) -> Self {
        let starts = |prefix: &str| {
            text.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        };

        if starts("add ") {
            Self::Add
        } else if starts("get ") {
            Self::Get
        } else if ["del", "delete", "rm", "remove"].into_iter().any(starts) {
            Self::Del
        } else {
            Self::Generic
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generic => "generic",
            Self::Add => "add",
            Self::Get => "get",
            Self::Del => "del",
            Self::Engine => "engine",
        };
        f.write_str(name)
    }
}

/// Immutable per-command properties consulted by the gate and help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    name: String,
    category: Category,
    required_permissions: Vec<String>,
    needs_database: bool,
    disallowed_in_safemode: bool,
    disabled: bool,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            required_permissions: Vec::new(),
            needs_database: false,
            disallowed_in_safemode: false,
            disabled: false,
        }
    }

    /// A command that never appears in help listings.
    pub fn hidden(category: Category) -> Self {
        Self::new(HIDDEN, category)
    }

    /// Permissions the caller must hold (all of them). Empty means public.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_database(mut self) -> Self {
        self.needs_database = true;
        self
    }

    #[must_use]
    pub fn with_safemode_disallowed(mut self) -> Self {
        self.disallowed_in_safemode = true;
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn required_permissions(&self) -> &[String] {
        &self.required_permissions
    }

    pub fn needs_database(&self) -> bool {
        self.needs_database
    }

    pub fn disallowed_in_safemode(&self) -> bool {
        self.disallowed_in_safemode
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_hidden(&self) -> bool {
        self.name == HIDDEN
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("add perm U1 chat", Category::Add)]
    #[case("ADD perm U1 chat", Category::Add)]
    #[case("get perms U1", Category::Get)]
    #[case("del perm U1 chat", Category::Del)]
    #[case("delete perm U1 chat", Category::Del)]
    #[case("rm perm U1 chat", Category::Del)]
    #[case("remove perm U1 chat", Category::Del)]
    #[case("add", Category::Generic)]
    #[case("address", Category::Generic)]
    #[case("getaway", Category::Generic)]
    #[case("whois <@U1>", Category::Generic)]
    #[case("", Category::Generic)]
    fn category_from_prefix(#[case] text: &str, #[case] expected: Category) {
        assert_eq!(Category::for_command(text), expected);
    }

    #[test]
    fn indexes_are_distinct() {
        let mut seen: Vec<usize> = Category::ALL.iter().map(|c| c.index()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), Category::COUNT);
    }

    #[test]
    fn builder_sets_flags() {
        let d = CommandDescriptor::new("add perm", Category::Add)
            .with_permissions(["perms"])
            .with_database()
            .with_safemode_disallowed();
        assert_eq!(d.name(), "add perm");
        assert_eq!(d.category(), Category::Add);
        assert_eq!(d.required_permissions(), ["perms".to_string()]);
        assert!(d.needs_database());
        assert!(d.disallowed_in_safemode());
        assert!(!d.is_disabled());
        assert!(!d.is_hidden());
        assert!(CommandDescriptor::hidden(Category::Generic).is_hidden());
    }
}
