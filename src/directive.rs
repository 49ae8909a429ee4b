//! Directive parsing
//!
//! A test program declares its expectations inside its first double-quoted
//! comment block:
//!
//! ```text
//! "
//! VM:
//!     case_sensitive: True
//!     custom_classpath: seg1:@ENVVAR:seg3
//!     stdout:
//!         first expected line
//!         ...
//!         last expected line
//!     stderr:
//!         expected error
//! "
//! ```
//!
//! The comment is scanned line by line with an explicit section state; a
//! `stdout:` block runs until the sibling `stderr:` marker (and vice versa)
//! or the end of the comment. Blank lines are formatting, not gaps — only
//! the literal token `...` is a gap. Unless `case_sensitive: True` is
//! present, expected lines are lowercased here and the captured output is
//! lowercased symmetrically at comparison time.
//!
//! Parsing never aborts discovery: a `custom_classpath:` naming an unset
//! environment variable produces a definition carrying the failure message,
//! which fails when run instead of when found.

use std::path::Path;

use crate::classpath::resolve_classpath;
use crate::definition::TestDefinition;
use crate::error::HarnessError;
use crate::matcher::Pattern;

/// Which expected-output block the scanner is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Stdout,
    Stderr,
}

/// Raw directive values as written, before case normalization and pattern
/// classification.
#[derive(Debug, Default)]
struct RawDirectives {
    case_sensitive: bool,
    classpath: Option<String>,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

/// The first double-quoted block of the source, if any.
fn comment_block(source: &str) -> Option<&str> {
    let start = source.find('"')? + 1;
    let end = source[start..].find('"')? + start;
    Some(&source[start..end])
}

fn push_line(lines: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(text.to_string());
    }
}

/// Scan a comment block for the four directives. `custom_classpath:` and
/// `case_sensitive:` are recognized anywhere, including inside an output
/// block, and are never treated as expected lines. Any other line outside
/// an output block (the `VM:` marker, prose) is ignored.
fn scan_comment(comment: &str) -> RawDirectives {
    let mut directives = RawDirectives::default();
    let mut section = Section::None;

    for raw in comment.lines() {
        let line = raw.trim();
        if let Some(rest) = line.strip_prefix("custom_classpath:") {
            directives.classpath = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("case_sensitive:") {
            directives.case_sensitive = matches!(rest.trim(), "True" | "true");
        } else if let Some(rest) = line.strip_prefix("stdout:") {
            section = Section::Stdout;
            push_line(&mut directives.stdout, rest);
        } else if let Some(rest) = line.strip_prefix("stderr:") {
            section = Section::Stderr;
            push_line(&mut directives.stderr, rest);
        } else {
            match section {
                Section::None => {}
                Section::Stdout => push_line(&mut directives.stdout, line),
                Section::Stderr => push_line(&mut directives.stderr, line),
            }
        }
    }

    directives
}

/// Whether a directive comment requests case-sensitive comparison.
/// Only the values `True` and `true` do; anything else, or no directive at
/// all, selects the default case-insensitive mode.
pub fn parse_case_sensitive(comment: &str) -> bool {
    scan_comment(comment).case_sensitive
}

/// Resolve the `custom_classpath:` directive of a comment, if present,
/// against the given environment lookup.
pub fn parse_custom_classpath(
    comment: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Option<String>, HarnessError> {
    match scan_comment(comment).classpath {
        Some(raw) => Ok(Some(resolve_classpath(&raw, lookup)?)),
        None => Ok(None),
    }
}

/// Build a [`TestDefinition`] from a test program's full source text.
///
/// Never fails: a source without a comment block yields empty expectations,
/// and a classpath resolution error is captured as a deferred failure so
/// that discovery can enumerate every test first.
pub fn parse_test_source(
    name: impl Into<String>,
    source: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> TestDefinition {
    let name = name.into();
    let directives = match comment_block(source) {
        Some(comment) => scan_comment(comment),
        None => RawDirectives::default(),
    };

    let case_sensitive = directives.case_sensitive;
    // Normalization happens after the whole comment is scanned, so a late
    // case_sensitive: directive still applies to both sequences.
    let to_patterns = |lines: &[String]| -> Vec<Pattern> {
        lines
            .iter()
            .map(|line| {
                if case_sensitive {
                    Pattern::parse(line)
                } else {
                    Pattern::parse(&line.to_lowercase())
                }
            })
            .collect()
    };

    let (custom_classpath, parse_failure) = match directives.classpath {
        Some(raw) => match resolve_classpath(&raw, lookup) {
            Ok(resolved) => (Some(resolved), None),
            Err(e) => (None, Some(e.to_string())),
        },
        None => (None, None),
    };

    TestDefinition {
        expected_stdout: to_patterns(&directives.stdout),
        expected_stderr: to_patterns(&directives.stderr),
        custom_classpath,
        case_sensitive,
        parse_failure,
        name,
    }
}

/// Parse a test file from disk, resolving `@NAME` segments against the
/// process environment. An unreadable file yields an inert definition, same
/// as any other parse failure.
pub fn parse_test_file(path: impl AsRef<Path>) -> TestDefinition {
    let path = path.as_ref();
    let name = path.to_string_lossy().into_owned();
    match std::fs::read_to_string(path) {
        Ok(source) => parse_test_source(name, &source, &|name| std::env::var(name).ok()),
        Err(e) => {
            let mut def = TestDefinition::empty(name);
            def.parse_failure = Some(format!("failed to read test file: {}", e));
            def
        }
    }
}
