//! Exception lists
//!
//! A YAML file sorts known-problematic tests into four categories:
//!
//! ```yaml
//! known_failures:
//!     - Tests/mutate_superclass_method/test.som
//! failing_as_unspecified:
//! unsupported:
//! do_not_run:
//! ```
//!
//! A test in one of the first three categories is expected to fail; it
//! failing is fine, it passing means the list is stale and is reported.
//! `do_not_run` tests are never executed at all, for cases where invocation
//! itself would break the harness. Missing or `null` keys are empty lists.

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::HarnessError;

/// How to treat an exception file whose YAML document is empty/`null`.
///
/// The lenient mode mirrors the long-standing behavior of treating such a
/// file as four empty lists; strict mode turns it into a configuration
/// error. Malformed YAML is always an error, regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExceptionsMode {
    #[default]
    Lenient,
    Strict,
}

/// The four exception categories, each an ordered list of test paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TestExceptions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub known_failures: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub failing_as_unspecified: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub unsupported: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub do_not_run: Vec<String>,
}

/// `key:` with no value and `key: null` both mean an empty list.
fn null_as_empty<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

impl TestExceptions {
    /// Parse exception lists from YAML text.
    pub fn from_yaml(text: &str, mode: ExceptionsMode) -> Result<Self, HarnessError> {
        let doc: Option<TestExceptions> = serde_yaml::from_str(text)?;
        match doc {
            Some(exceptions) => Ok(exceptions),
            None => match mode {
                ExceptionsMode::Lenient => Ok(TestExceptions::default()),
                ExceptionsMode::Strict => Err(HarnessError::exception_list(
                    "exception list document is empty",
                )),
            },
        }
    }

    /// Load exception lists from a YAML file.
    pub fn load(path: impl AsRef<Path>, mode: ExceptionsMode) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::exception_list(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text, mode).map_err(|e| {
            HarnessError::exception_list(format!("{}: {}", path.display(), e.message))
        })
    }

    /// Join every entry with a base directory prefix, so relative paths in
    /// the file line up with the paths the runner discovers.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let join = |entries: &[String]| {
            entries
                .iter()
                .map(|e| base.join(e).to_string_lossy().into_owned())
                .collect()
        };
        Self {
            known_failures: join(&self.known_failures),
            failing_as_unspecified: join(&self.failing_as_unspecified),
            unsupported: join(&self.unsupported),
            do_not_run: join(&self.do_not_run),
        }
    }

    pub fn is_known_failure(&self, name: &str) -> bool {
        self.known_failures.iter().any(|t| t == name)
    }

    pub fn is_failing_as_unspecified(&self, name: &str) -> bool {
        self.failing_as_unspecified.iter().any(|t| t == name)
    }

    pub fn is_unsupported(&self, name: &str) -> bool {
        self.unsupported.iter().any(|t| t == name)
    }

    pub fn is_do_not_run(&self, name: &str) -> bool {
        self.do_not_run.iter().any(|t| t == name)
    }

    /// Whether any of the expected-to-fail categories lists this test.
    pub fn expects_failure(&self, name: &str) -> bool {
        self.is_known_failure(name) || self.is_failing_as_unspecified(name) || self.is_unsupported(name)
    }

    /// The name of the first category listing this test, checked in the
    /// order known_failures, failing_as_unspecified, unsupported.
    pub fn failure_category(&self, name: &str) -> Option<&'static str> {
        if self.is_known_failure(name) {
            Some("known_failures")
        } else if self.is_failing_as_unspecified(name) {
            Some("failing_as_unspecified")
        } else if self.is_unsupported(name) {
            Some("unsupported")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    #[test]
    fn test_all_categories_populated() {
        let yaml = "\
known_failures:
    - Tests/mutate_superclass_method/test.som
failing_as_unspecified:
    - Tests/mutate_superclass_method/test.som
unsupported:
    - Tests/mutate_superclass_method/test.som
do_not_run:
    - Tests/mutate_superclass_method/test.som
";
        let ex = TestExceptions::from_yaml(yaml, ExceptionsMode::Lenient).unwrap();
        let entry = "Tests/mutate_superclass_method/test.som";
        assert!(ex.is_known_failure(entry));
        assert!(ex.is_failing_as_unspecified(entry));
        assert!(ex.is_unsupported(entry));
        assert!(ex.is_do_not_run(entry));
        assert!(ex.expects_failure(entry));
        assert_eq!(ex.failure_category(entry), Some("known_failures"));
    }

    #[test]
    fn test_missing_keys_are_empty_lists() {
        let ex = TestExceptions::from_yaml("known_failures:\n", ExceptionsMode::Lenient).unwrap();
        assert!(ex.known_failures.is_empty());
        assert!(ex.failing_as_unspecified.is_empty());
        assert!(ex.unsupported.is_empty());
        assert!(ex.do_not_run.is_empty());
    }

    #[test]
    fn test_null_keys_are_empty_lists() {
        let yaml = "\
known_failures: null
failing_as_unspecified: null
unsupported: null
do_not_run: null
";
        let ex = TestExceptions::from_yaml(yaml, ExceptionsMode::Lenient).unwrap();
        assert_eq!(ex, TestExceptions::default());
    }

    #[test]
    fn test_empty_document_lenient_vs_strict() {
        let ex = TestExceptions::from_yaml("", ExceptionsMode::Lenient).unwrap();
        assert_eq!(ex, TestExceptions::default());

        let err = TestExceptions::from_yaml("", ExceptionsMode::Strict).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExceptionList);
    }

    #[test]
    fn test_malformed_yaml_is_always_fatal() {
        let yaml = "known_failures: [unclosed";
        assert!(TestExceptions::from_yaml(yaml, ExceptionsMode::Lenient).is_err());
        assert!(TestExceptions::from_yaml(yaml, ExceptionsMode::Strict).is_err());
    }

    #[test]
    fn test_resolved_against_prefixes_every_entry() {
        let ex = TestExceptions {
            known_failures: vec!["Tests/a.som".into()],
            do_not_run: vec!["Tests/b.som".into()],
            ..Default::default()
        };
        let resolved = ex.resolved_against(&PathBuf::from("core-lib/IntegrationTests"));
        assert!(resolved.is_known_failure("core-lib/IntegrationTests/Tests/a.som"));
        assert!(resolved.is_do_not_run("core-lib/IntegrationTests/Tests/b.som"));
        assert!(!resolved.is_known_failure("Tests/a.som"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exceptions.yaml");
        std::fs::write(&path, "do_not_run:\n    - Tests/hangs.som\n").unwrap();
        let ex = TestExceptions::load(&path, ExceptionsMode::Lenient).unwrap();
        assert!(ex.is_do_not_run("Tests/hangs.som"));

        let err = TestExceptions::load(dir.path().join("missing.yaml"), ExceptionsMode::Lenient)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExceptionList);
    }
}
