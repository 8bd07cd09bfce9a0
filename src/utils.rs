//!
//! Environment substitution for configuration text.
//!

use {
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
};

/// Matches `{{ VAR_NAME }}` with optional whitespace inside the braces.
/// Names follow the usual environment variable convention: uppercase
/// letters, digits and underscores.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// Replaces every `{{ VAR }}` reference in `input` with the value of the
/// environment variable `VAR`.
///
/// Unset variables are replaced with an empty string and a warning is
/// logged, so a configuration can point `basedir` or `directory` at a
/// location that differs per machine:
///
/// ```rust
/// use axum_enroute::replace_handlebars_with_env;
///
/// unsafe { std::env::set_var("APP_ROOT", "/srv/app") };
/// assert_eq!(
///     replace_handlebars_with_env("basedir = \"{{ APP_ROOT }}\""),
///     "basedir = \"/srv/app\""
/// );
/// assert_eq!(replace_handlebars_with_env("{{ NOT_SET_ANYWHERE }}"), "");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lowercase_names_are_not_substituted() {
        let input = "{{ lower_case }}";
        assert_eq!(replace_handlebars_with_env(input), input);
    }

    #[test]
    fn test_substitution_inside_toml() {
        unsafe {
            env::set_var("UTILS_ROUTE_DIR", "controllers");
        }
        let toml = "[routing]\ndirectory = \"{{UTILS_ROUTE_DIR}}\"";
        assert_eq!(
            replace_handlebars_with_env(toml),
            "[routing]\ndirectory = \"controllers\""
        );
        unsafe {
            env::remove_var("UTILS_ROUTE_DIR");
        }
    }

    proptest! {
        #[test]
        fn handlebars_no_pattern_unchanged(s in "[^{}]*") {
            let result = replace_handlebars_with_env(&s);
            prop_assert_eq!(result, s);
        }

        #[test]
        fn handlebars_never_panics(s in ".*") {
            let _ = replace_handlebars_with_env(&s);
        }

        #[test]
        fn handlebars_unset_variable_vanishes(
            prefix in "[a-z ]{0,8}",
            suffix in "[a-z ]{0,8}",
        ) {
            let input = format!("{prefix}{{{{ UTILS_NEVER_SET_VARIABLE }}}}{suffix}");
            prop_assert_eq!(replace_handlebars_with_env(&input), format!("{prefix}{suffix}"));
        }
    }
}
