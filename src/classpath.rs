//! Custom classpath resolution
//!
//! A `custom_classpath:` directive holds colon-separated segments. A segment
//! of the form `@NAME` is replaced with the value of the environment variable
//! `NAME`; every other segment passes through unchanged. Resolution is
//! fail-fast: the first missing variable aborts with an error naming it, and
//! later segments are never inspected.

use crate::error::HarnessError;

/// Resolve a raw classpath value against an injected environment lookup.
///
/// The lookup is a function so tests can resolve against a fixed map instead
/// of mutating the process environment.
pub fn resolve_classpath(
    raw: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, HarnessError> {
    let mut segments = Vec::new();
    for segment in raw.split(':') {
        match segment.strip_prefix('@') {
            Some(name) => match lookup(name) {
                Some(value) => segments.push(value),
                None => return Err(HarnessError::missing_env(name)),
            },
            None => segments.push(segment.to_string()),
        }
    }
    Ok(segments.join(":"))
}

/// Resolve against the process environment.
pub fn resolve_classpath_from_env(raw: &str) -> Result<String, HarnessError> {
    resolve_classpath(raw, &|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::cell::RefCell;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_substitutes_every_at_segment() {
        let lookup = env(&[("custom_1", "classpath_1"), ("custom_2", "classpath_2")]);
        let resolved =
            resolve_classpath("@custom_1:./some/other/one:@custom_2", &lookup).unwrap();
        assert_eq!(resolved, "classpath_1:./some/other/one:classpath_2");
    }

    #[test]
    fn test_plain_segments_pass_through() {
        let lookup = env(&[("AWFY", "core-lib/AreWeFastYet/Core")]);
        let resolved = resolve_classpath("one/the/outside:@AWFY:then/another/one", &lookup).unwrap();
        assert_eq!(resolved, "one/the/outside:core-lib/AreWeFastYet/Core:then/another/one");
    }

    #[test]
    fn test_single_segment_substitution() {
        let lookup = env(&[("only", "resolved/path")]);
        assert_eq!(resolve_classpath("@only", &lookup).unwrap(), "resolved/path");
        assert_eq!(resolve_classpath("plain/path", &lookup).unwrap(), "plain/path");
    }

    #[test]
    fn test_missing_variable_names_the_variable() {
        let lookup = env(&[]);
        let err = resolve_classpath("@IDontExist", &lookup).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingEnvVar);
        assert_eq!(err.message, "Environment variable IDontExist not set");
    }

    #[test]
    fn test_first_missing_wins_without_inspecting_later_segments() {
        let asked: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let lookup = |name: &str| {
            asked.borrow_mut().push(name.to_string());
            None
        };
        let err = resolve_classpath("@no_exist_1:./some/other/one:@no_exist_2", &lookup).unwrap_err();
        assert_eq!(err.message, "Environment variable no_exist_1 not set");
        assert_eq!(asked.borrow().as_slice(), ["no_exist_1"]);
    }
}
