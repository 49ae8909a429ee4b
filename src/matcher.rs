//! Output pattern matching
//!
//! Decides whether a VM's captured output satisfies the expected sequence
//! extracted from a test program's directive comment. Three wildcard forms
//! are supported:
//!
//! - `...` on a line of its own is a gap: zero or more unconstrained actual
//!   lines may appear before the next expected line must match.
//! - `...` embedded in a line splits it into fragments that must all appear,
//!   in order, as substrings of one actual line.
//! - `needed***optional` matches a line containing `needed`, followed
//!   immediately by `optional` — which may be cut short by the end of the
//!   line, but never contradicted by it.
//!
//! Patterns are not regular expressions. Case folding happens before the
//! matcher runs; everything here compares text verbatim.

use std::fmt;

/// One line of an expected output sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The literal token `...`: consumes zero or more actual lines.
    Gap,
    /// `needed***optional`: substring presence plus truncation-tolerant
    /// suffix matching (see [`check_partial_word`]).
    Partial { needed: String, optional: String },
    /// A literal line with embedded `...` gaps, split into the fragments
    /// between them. Matches a line containing every fragment in order.
    Fragments(Vec<String>),
    /// Exact (trimmed) string equality.
    Literal(String),
}

impl Pattern {
    /// Classify one expected line. The line is trimmed first; blank-line
    /// filtering is the directive parser's job.
    pub fn parse(line: &str) -> Pattern {
        let line = line.trim();
        if line == "..." {
            return Pattern::Gap;
        }
        if let Some((needed, optional)) = line.split_once("***") {
            return Pattern::Partial {
                needed: needed.to_string(),
                optional: optional.to_string(),
            };
        }
        if line.contains("...") {
            return Pattern::Fragments(line.split("...").map(str::to_string).collect());
        }
        Pattern::Literal(line.to_string())
    }

    /// Test a single (already trimmed) actual line against this pattern.
    /// A bare gap tolerates any line; the sequence matcher consumes gaps
    /// before ever calling this.
    fn matches_line(&self, line: &str) -> bool {
        match self {
            Pattern::Gap => true,
            Pattern::Partial { needed, optional } => partial_word_match(line, needed, optional),
            Pattern::Fragments(frags) => {
                let mut pos = 0;
                for frag in frags {
                    match line[pos..].find(frag.as_str()) {
                        Some(i) => pos += i + frag.len(),
                        None => return false,
                    }
                }
                true
            }
            Pattern::Literal(text) => line == text,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Gap => write!(f, "..."),
            Pattern::Partial { needed, optional } => write!(f, "{}***{}", needed, optional),
            Pattern::Fragments(frags) => write!(f, "{}", frags.join("...")),
            Pattern::Literal(text) => write!(f, "{}", text),
        }
    }
}

/// Check whether `actual` contains `expected` as an order-preserving,
/// gap-tolerant sequence of matches.
///
/// Both sequences are walked left to right exactly once. Actual lines that
/// fail to match the current expected entry are skipped as tolerated extra
/// output. The match succeeds only when every expected entry has been
/// consumed: a trailing unconsumed gap still needs one more actual line to
/// trigger its advance.
pub fn check_output_matches(actual: &[&str], expected: &[Pattern]) -> bool {
    let mut next = 0;
    for raw in actual {
        let line = raw.trim();
        // A gap consumes nothing on its own; advance past it and re-test
        // this same line against whatever follows.
        while matches!(expected.get(next), Some(Pattern::Gap)) {
            next += 1;
        }
        if next == expected.len() {
            return true;
        }
        if expected[next].matches_line(line) {
            next += 1;
        }
    }
    next == expected.len()
}

/// Match one word against a `needed***optional` pattern.
///
/// `needed` must appear as a substring. Starting immediately after its first
/// occurrence, the word must continue with the characters of `optional` — the
/// word ending early is tolerated (a truncated print still counts), but a
/// character that disagrees with `optional`, or characters left over after
/// the full suffix, fail the match.
pub fn check_partial_word(word: &str, pattern: &str) -> bool {
    let (needed, optional) = match pattern.split_once("***") {
        Some((needed, optional)) => (needed, optional),
        None => (pattern, ""),
    };
    partial_word_match(word, needed, optional)
}

fn partial_word_match(word: &str, needed: &str, optional: &str) -> bool {
    let start = match word.find(needed) {
        Some(pos) => pos + needed.len(),
        None => return false,
    };
    let mut rest = word[start..].chars();
    for want in optional.chars() {
        match rest.next() {
            None => return true, // word ran out early: tolerated
            Some(c) if c == want => {}
            Some(_) => return false,
        }
    }
    rest.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(lines: &[&str]) -> Vec<Pattern> {
        lines.iter().map(|l| Pattern::parse(l)).collect()
    }

    fn lines(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }

    #[test]
    fn test_classify_gap() {
        assert_eq!(Pattern::parse("..."), Pattern::Gap);
        assert_eq!(Pattern::parse("  ...  "), Pattern::Gap);
    }

    #[test]
    fn test_classify_partial() {
        assert_eq!(
            Pattern::parse("Really***LongWord"),
            Pattern::Partial {
                needed: "Really".into(),
                optional: "LongWord".into(),
            }
        );
    }

    #[test]
    fn test_classify_fragments() {
        assert_eq!(
            Pattern::parse("Hello ... world"),
            Pattern::Fragments(vec!["Hello ".into(), " world".into()])
        );
    }

    #[test]
    fn test_classify_literal() {
        assert_eq!(Pattern::parse("  plain line  "), Pattern::Literal("plain line".into()));
    }

    #[test]
    fn test_display_round_trips_source_text() {
        for src in ["...", "Really***LongWord", "a ... b ... c", "plain"] {
            assert_eq!(Pattern::parse(src).to_string(), src);
        }
    }

    #[test]
    fn test_check_partial_word_matches() {
        // Progressively truncated suffixes all match.
        for word in [
            "1.111111111",
            "1.1111111111",
            "1.11111111111",
            "1.1111111111111",
            "1.11111111111111",
            "1.111111111111111",
            "1.1111111111111111",
            "1.11111111111111111",
            "1.111111111111111111",
            "1.1111111111111111111",
        ] {
            assert!(
                check_partial_word(word, "1.111111111***1111111111"),
                "expected {:?} to match",
                word
            );
        }
    }

    #[test]
    fn test_check_partial_word_does_not_match() {
        // Too short to contain `needed`, a wrong character mid-suffix, or
        // characters left over past the full suffix.
        for word in [
            "",
            "1",
            "1.",
            "1.1",
            "1.11",
            "1.111",
            "1.1111",
            "1.11111",
            "1.111111",
            "1.1111111",
            "1.11111111",
            "1.1111111112",
            "1.211111111111111",
            "1.11111111111111111111",
            "1.11111111111111111112",
        ] {
            assert!(
                !check_partial_word(word, "1.111111111***1111111111"),
                "expected {:?} not to match",
                word
            );
        }
    }

    #[test]
    fn test_check_partial_word_truncation_policy() {
        assert!(check_partial_word("Really", "Really***LongWord"));
        assert!(check_partial_word("ReallyLo", "Really***LongWord"));
        assert!(check_partial_word("ReallyLongWord", "Really***LongWord"));
        // Extra trailing characters are not tolerated.
        assert!(!check_partial_word("ReallyLongWordExtra", "Really***LongWord"));
        assert!(!check_partial_word("ReallyLongTestFunction", "Really***LongWord"));
    }

    #[test]
    fn test_check_partial_word_without_separator_is_containment() {
        assert!(check_partial_word("say hello twice", "hello"));
        assert!(!check_partial_word("say goodbye", "hello"));
    }

    #[test]
    fn test_empty_expected_matches_anything() {
        assert!(check_output_matches(&[], &[]));
        assert!(check_output_matches(&["a", "b"], &[]));
    }

    #[test]
    fn test_literal_sequence_in_order() {
        let expected = patterns(&["1", "2", "...", "10"]);
        let printed = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10";
        assert!(check_output_matches(&lines(printed), &expected));

        let truncated = "1\n2\n3\n4\n5";
        assert!(!check_output_matches(&lines(truncated), &expected));
    }

    #[test]
    fn test_gap_between_anchors() {
        let out = "Hello World\nSome other output in the Middle\nThis is a test\n".to_lowercase();
        let expected = patterns(&["hello world", "...", "this is a test"]);
        assert!(check_output_matches(&lines(&out), &expected));
    }

    #[test]
    fn test_gap_monotonicity() {
        let expected = patterns(&["...", "target"]);
        assert!(check_output_matches(&["x", "y", "target"], &expected));
        assert!(check_output_matches(&["target"], &expected));
        assert!(!check_output_matches(&["x", "y"], &expected));
    }

    #[test]
    fn test_embedded_gaps_within_lines() {
        let out = "This is SOM++\n\
                   Hello Rhys this is some sample output\n\
                   1\n2\n3\n4\n4\n56\n6\n7\n7\n8\n9\n9\n\
                   1010101\n10101\n1010101\n\
                   1010101010101010100101010101010010101\n\
                   Rhys Walker\n\
                   Moving on\n\
                   Extra text\n\
                   more Numbers\n\
                   NUMBER NUMBER NUMBER NUMBER\n";
        let expected = patterns(&[
            "Hello ... this is ... sample output",
            "Rhys Walker",
            "... on",
            "more ...",
            "... NUMBER ... NUMBER",
        ]);
        assert!(check_output_matches(&lines(out), &expected));
    }

    #[test]
    fn test_embedded_gap_fragments_must_keep_order() {
        let out = "This is SOM++\n\
                   Hello, this is some sample output\n\
                   There is some more on this line\n\
                   And a little more here\n";
        let expected = patterns(&[
            "Hello, ... sample ...",
            "... is ... this line",
            "... little ...",
        ]);
        assert!(check_output_matches(&lines(out), &expected));
    }

    #[test]
    fn test_partial_word_after_gap() {
        let expected = patterns(&["...", "Really***LongWord"]);
        for tail in ["ReallyLongWord", "Really", "ReallyLong", "ReallyLo"] {
            let out = format!("Some output, as an example\nExtra Line\n{}", tail);
            assert!(check_output_matches(&lines(&out), &expected), "tail {:?}", tail);
        }
        for tail in ["ReallyLongTestFunction", "ReallyLongWordExtra"] {
            let out = format!("Some output, as an example\nExtra Line\n{}", tail);
            assert!(!check_output_matches(&lines(&out), &expected), "tail {:?}", tail);
        }
    }

    #[test]
    fn test_case_matters_inside_the_matcher() {
        // Folding is the caller's job; the matcher compares verbatim.
        let expected = patterns(&["hello world", "...", "this is a test"]);
        let out = "Hello World\nSome other output in the Middle\nThis is a test\n";
        assert!(!check_output_matches(&lines(out), &expected));
    }

    #[test]
    fn test_whitespace_stripping_is_idempotent() {
        let expected = patterns(&["alpha", "beta"]);
        assert!(check_output_matches(&["  alpha  ", "\tbeta"], &expected));
        assert!(check_output_matches(&["alpha", "beta"], &expected));
    }

    #[test]
    fn test_trailing_gap_requires_a_line_to_consume() {
        let expected = patterns(&["alpha", "..."]);
        assert!(check_output_matches(&["alpha", "anything"], &expected));
        assert!(!check_output_matches(&["alpha"], &expected));
    }

    #[test]
    fn test_expected_prefix_of_longer_output() {
        let expected = patterns(&["one", "two"]);
        assert!(check_output_matches(&["one", "two", "three", "four"], &expected));
    }
}
