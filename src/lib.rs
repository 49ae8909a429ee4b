//! som-conformance: a conformance test harness for SOM virtual machines
//!
//! # Overview
//!
//! This crate runs `.som` test programs against an external VM and checks
//! the captured stdout/stderr against expectations embedded in each
//! program's leading comment. Tests are discovered recursively (any file
//! with the right extension carrying a `VM:` marker), executed with
//! `<vm> -cp <classpath> <file>`, and judged by a wildcard-aware sequence
//! matcher.
//!
//! # Directive Syntax
//!
//! ```text
//! "
//! VM:
//!     case_sensitive: True
//!     custom_classpath: core-lib/Smalltalk:@EXTRA_CP
//!     stdout:
//!         first expected line
//!         ...
//!         last expected line
//!     stderr:
//!         expected error
//! "
//! ```
//!
//! | Directive | Meaning |
//! |-----------|---------|
//! | `stdout:` / `stderr:` | Expected output lines, in order |
//! | `...` (own line) | Gap: zero or more unconstrained lines |
//! | `a ... b` (embedded) | One line containing `a` then `b` |
//! | `needed***optional` | Partial word, truncation tolerated |
//! | `case_sensitive:` | `True` compares verbatim; default folds case |
//! | `custom_classpath:` | Overrides `-cp`; `@NAME` reads the environment |
//!
//! # Exception Categories
//!
//! A YAML file may sort tests into `known_failures`,
//! `failing_as_unspecified`, `unsupported` (expected to fail; passing is
//! reported as a stale entry) and `do_not_run` (never executed).

mod classpath;
mod definition;
mod directive;
mod error;
mod exceptions;
mod matcher;
mod report;
mod runner;

pub use classpath::{resolve_classpath, resolve_classpath_from_env};
pub use definition::TestDefinition;
pub use directive::{
    parse_case_sensitive, parse_custom_classpath, parse_test_file, parse_test_source,
};
pub use error::{ErrorKind, HarnessError};
pub use exceptions::{ExceptionsMode, TestExceptions};
pub use matcher::{check_output_matches, check_partial_word, Pattern};
pub use report::SessionReport;
pub use runner::{RunConfig, TestCaseResult, TestRunner, TestStatus};
