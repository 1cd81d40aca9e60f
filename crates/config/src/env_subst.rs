/// Replace `${VAR}` and `${VAR:-default}` placeholders in raw config text.
///
/// Unresolvable variables without a default are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with an injectable lookup, so tests never touch
/// the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder untouched.
            result.push_str(&rest[start..]);
            return result;
        };

        let body = &after[..end];
        let (name, default) = match body.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), default) {
            (false, Some(value), _) => result.push_str(&value),
            (false, None, Some(default)) => result.push_str(default),
            _ => {
                result.push_str("${");
                result.push_str(body);
                result.push('}');
            },
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "GRACELESS_TEST_DB" => Some("/tmp/users.db".to_string()),
            _ => None,
        }
    }

    #[rstest]
    #[case("path = \"${GRACELESS_TEST_DB}\"", "path = \"/tmp/users.db\"")]
    #[case("${GRACELESS_UNSET}", "${GRACELESS_UNSET}")]
    #[case("${GRACELESS_UNSET:-.}", ".")]
    #[case("${GRACELESS_TEST_DB:-ignored}", "/tmp/users.db")]
    #[case("${}", "${}")]
    #[case("tail ${GRACELESS_TEST_DB", "tail ${GRACELESS_TEST_DB")]
    #[case("a ${GRACELESS_TEST_DB} b ${GRACELESS_TEST_DB}", "a /tmp/users.db b /tmp/users.db")]
    #[case("plain text", "plain text")]
    fn substitutes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_env_with(input, lookup), expected);
    }
}
