//! Test runner
//!
//! Orchestrates a conformance run — discovers `.som` test programs under a
//! directory, parses their directive comments, invokes the VM under test per
//! program, matches captured output, and applies the exception categories to
//! turn raw match results into verdicts.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use similar::TextDiff;

use crate::definition::TestDefinition;
use crate::directive::parse_test_file;
use crate::exceptions::TestExceptions;
use crate::matcher::{check_output_matches, Pattern};
use crate::report::SessionReport;

/// Marker a source file must contain to be recognized as a test program.
const VM_MARKER: &str = "VM:";

/// Configuration for a conformance run
pub struct RunConfig {
    /// Directory containing test programs
    pub tests_dir: PathBuf,
    /// The VM executable under test
    pub vm: PathBuf,
    /// Default classpath, passed as `-cp` unless a test overrides it
    pub classpath: String,
    /// Exception categories (already base-resolved)
    pub exceptions: TestExceptions,
    /// Where the exceptions came from, echoed in the report
    pub exceptions_path: Option<PathBuf>,
    /// Directory to write `report.txt` into, if any
    pub report_dir: Option<PathBuf>,
    /// Optional filter — only run tests whose path contains this string
    pub filter: Option<String>,
    /// Test file extension
    pub extension: String,
    /// Verbose mode — print per-case execution logs
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from("Tests"),
            vm: PathBuf::new(),
            classpath: String::new(),
            exceptions: TestExceptions::default(),
            exceptions_path: None,
            report_dir: None,
            filter: None,
            extension: ".som".into(),
            verbose: false,
        }
    }
}

/// Verdict for a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    /// Output matched and the test was expected to pass
    Passed,
    /// Output did not match and no exception category covers the test
    Failed,
    /// Not executed: listed in `do_not_run`, or output was undecodable
    Skipped,
    /// Listed in an exception category and failed, as predicted
    ExpectedFailure,
    /// Listed in an exception category but matched — the list is stale
    UnexpectedPass,
}

/// Result of a single test case
#[derive(Debug)]
pub struct TestCaseResult {
    /// Test name (the discovered path string)
    pub name: String,
    /// Verdict
    pub status: TestStatus,
    /// Failure or skip explanation
    pub message: Option<String>,
    /// Execution log (command line, classpath choice, exit code)
    pub log: String,
    /// Duration
    pub duration: Duration,
}

/// The conformance test runner
pub struct TestRunner {
    config: RunConfig,
}

impl TestRunner {
    /// Create a new runner with the given config
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Discover test programs in the configured directory: files with the
    /// configured extension whose contents carry the `VM:` marker. Results
    /// are sorted for a deterministic run order.
    pub fn discover(&self) -> Result<Vec<PathBuf>, std::io::Error> {
        let dir = &self.config.tests_dir;
        if !dir.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("test directory not found: {}", dir.display()),
            ));
        }

        let mut files = Vec::new();
        self.scan_dir(dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn scan_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.scan_dir(&path, files)?;
            } else if self.is_test_file(&path) {
                if let Some(ref filter) = self.config.filter {
                    if !path.to_string_lossy().contains(filter.as_str()) {
                        continue;
                    }
                }
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_test_file(&self, path: &Path) -> bool {
        let named_like_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(self.config.extension.as_str()))
            .unwrap_or(false);
        if !named_like_test {
            return false;
        }
        // A file that cannot be read as text cannot carry the marker.
        std::fs::read_to_string(path)
            .map(|contents| contents.contains(VM_MARKER))
            .unwrap_or(false)
    }

    /// Parse every discovered test into a definition. Parse problems are
    /// captured inside the definitions, so the full list always enumerates.
    pub fn definitions(&self) -> Result<Vec<TestDefinition>, std::io::Error> {
        Ok(self.discover()?.iter().map(parse_test_file).collect())
    }

    /// Run all discovered tests, recording every case into a session report.
    pub fn run_all(&self) -> Result<SessionReport, std::io::Error> {
        let start = Instant::now();
        let definitions = self.definitions()?;

        let mut report = SessionReport::new();
        for def in &definitions {
            report.record(self.run_one(def));
        }
        report.duration = start.elapsed();
        Ok(report)
    }

    /// Run a single test definition to a verdict.
    pub fn run_one(&self, def: &TestDefinition) -> TestCaseResult {
        let start = Instant::now();
        let mut log = String::new();

        if self.config.exceptions.is_do_not_run(&def.name) {
            return TestCaseResult {
                name: def.name.clone(),
                status: TestStatus::Skipped,
                message: Some("listed in do_not_run".into()),
                log,
                duration: start.elapsed(),
            };
        }

        // An inert definition fails with its parse message; the VM is never
        // spawned for it.
        if let Some(ref msg) = def.parse_failure {
            logf(&mut log, "definition is inert, not invoking the VM");
            return self.verdict(def, false, Some(msg.clone()), log, start);
        }

        let classpath = def
            .custom_classpath
            .as_deref()
            .unwrap_or(self.config.classpath.as_str());
        if def.custom_classpath.is_some() {
            logf(&mut log, &format!("using custom classpath: {}", classpath));
        }

        let command_line = format!(
            "{} -cp {} {}",
            self.config.vm.display(),
            classpath,
            def.name
        );
        logf(&mut log, &format!("> {}", command_line));

        let output = match Command::new(&self.config.vm)
            .arg("-cp")
            .arg(classpath)
            .arg(&def.name)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                let msg = format!("failed to execute {}: {}", self.config.vm.display(), e);
                return self.verdict(def, false, Some(msg), log, start);
            }
        };

        // Undecodable output is an environment limitation, not a wrong
        // answer: skip instead of failing.
        let stdout = match String::from_utf8(output.stdout) {
            Ok(s) => s,
            Err(_) => return skip_undecodable(def, "stdout", log, start),
        };
        let stderr = match String::from_utf8(output.stderr) {
            Ok(s) => s,
            Err(_) => return skip_undecodable(def, "stderr", log, start),
        };

        // Non-zero exit codes are reported but never a verdict input.
        let exit_note = match output.status.code() {
            Some(0) => None,
            Some(code) => Some(format!("command exited with code {}", code)),
            None => Some("command terminated by signal".to_string()),
        };
        if let Some(ref note) = exit_note {
            logf(&mut log, note);
        }

        let (stdout, stderr) = if def.case_sensitive {
            (stdout, stderr)
        } else {
            (stdout.to_lowercase(), stderr.to_lowercase())
        };

        let stdout_lines: Vec<&str> = stdout.lines().collect();
        let stderr_lines: Vec<&str> = stderr.lines().collect();
        let stdout_ok = check_output_matches(&stdout_lines, &def.expected_stdout);
        let stderr_ok = check_output_matches(&stderr_lines, &def.expected_stderr);
        let matched = stdout_ok && stderr_ok;

        let message = if matched {
            None
        } else {
            Some(mismatch_message(
                def,
                &command_line,
                &stdout,
                &stderr,
                stdout_ok,
                stderr_ok,
                exit_note.as_deref(),
            ))
        };

        self.verdict(def, matched, message, log, start)
    }

    /// Fold the raw match result through the exception categories.
    fn verdict(
        &self,
        def: &TestDefinition,
        matched: bool,
        failure: Option<String>,
        log: String,
        start: Instant,
    ) -> TestCaseResult {
        let (status, message) = match self.config.exceptions.failure_category(&def.name) {
            Some(category) => {
                if matched {
                    (
                        TestStatus::UnexpectedPass,
                        Some(format!("listed in {} but passed", category)),
                    )
                } else {
                    (TestStatus::ExpectedFailure, failure)
                }
            }
            None => {
                if matched {
                    (TestStatus::Passed, None)
                } else {
                    (TestStatus::Failed, failure)
                }
            }
        };

        TestCaseResult {
            name: def.name.clone(),
            status,
            message,
            log,
            duration: start.elapsed(),
        }
    }
}

fn logf(log: &mut String, msg: &str) {
    log.push_str(msg);
    if !msg.ends_with('\n') {
        log.push('\n');
    }
}

fn skip_undecodable(
    def: &TestDefinition,
    stream: &str,
    log: String,
    start: Instant,
) -> TestCaseResult {
    TestCaseResult {
        name: def.name.clone(),
        status: TestStatus::Skipped,
        message: Some(format!("{} could not be decoded as UTF-8", stream)),
        log,
        duration: start.elapsed(),
    }
}

/// Build the expected-vs-actual failure message, with a unified diff per
/// mismatched stream for human inspection.
fn mismatch_message(
    def: &TestDefinition,
    command_line: &str,
    stdout: &str,
    stderr: &str,
    stdout_ok: bool,
    stderr_ok: bool,
    exit_note: Option<&str>,
) -> String {
    let mut msg = format!("output mismatch for {}\n", def.name);
    push_expected(&mut msg, "expected stdout", &def.expected_stdout);
    push_actual(&mut msg, "actual stdout", stdout);
    push_expected(&mut msg, "expected stderr", &def.expected_stderr);
    push_actual(&mut msg, "actual stderr", stderr);
    msg.push_str(&format!("command: {}\n", command_line));
    if let Some(note) = exit_note {
        msg.push_str(note);
        msg.push('\n');
    }
    if !stdout_ok {
        msg.push_str(&diff_section("stdout", &def.expected_stdout, stdout));
    }
    if !stderr_ok {
        msg.push_str(&diff_section("stderr", &def.expected_stderr, stderr));
    }
    msg
}

fn push_expected(msg: &mut String, label: &str, expected: &[Pattern]) {
    msg.push_str(label);
    msg.push_str(":\n");
    for pattern in expected {
        msg.push_str(&format!("    {}\n", pattern));
    }
}

fn push_actual(msg: &mut String, label: &str, actual: &str) {
    msg.push_str(label);
    msg.push_str(":\n");
    for line in actual.lines() {
        msg.push_str(&format!("    {}\n", line));
    }
}

fn diff_section(stream: &str, expected: &[Pattern], actual: &str) -> String {
    let expected_text: String = expected.iter().map(|p| format!("{}\n", p)).collect();
    let diff = TextDiff::from_lines(expected_text.as_str(), actual);
    let udiff = diff
        .unified_diff()
        .header(&format!("expected {}", stream), &format!("actual {}", stream))
        .to_string();
    format!("--- {} diff ---\n{}", stream, udiff)
}
