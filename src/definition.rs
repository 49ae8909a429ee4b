//! Test definitions
//!
//! A [`TestDefinition`] is the parsed form of one discovered test program:
//! its identity, its expected stdout/stderr pattern sequences, and the
//! classpath/case options from its directive comment. Definitions are built
//! once at discovery time and never mutated afterwards.

use crate::matcher::Pattern;

/// One discovered test, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDefinition {
    /// Test identity: the path string used for display and as the
    /// exception-list lookup key.
    pub name: String,
    /// Expected stdout lines, in required order of appearance.
    pub expected_stdout: Vec<Pattern>,
    /// Expected stderr lines, in required order of appearance.
    pub expected_stderr: Vec<Pattern>,
    /// Resolved classpath override; `None` means the harness default.
    pub custom_classpath: Option<String>,
    /// When false (the default), patterns were lowercased at parse time and
    /// the captured output is lowercased before comparison.
    pub case_sensitive: bool,
    /// Set when directive parsing failed (e.g. an unset `@NAME` variable).
    /// An inert definition never runs the VM; it fails with this message.
    pub parse_failure: Option<String>,
}

impl TestDefinition {
    /// An empty definition for the given name: no expectations, default
    /// classpath, case-insensitive.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_stdout: Vec::new(),
            expected_stderr: Vec::new(),
            custom_classpath: None,
            case_sensitive: false,
            parse_failure: None,
        }
    }

    /// Whether this definition can only fail (parsing already failed).
    pub fn is_inert(&self) -> bool {
        self.parse_failure.is_some()
    }
}
