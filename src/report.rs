//! Session reporting
//!
//! A [`SessionReport`] is the single accumulator for one conformance run:
//! every case result is recorded into it, and it alone knows the aggregate
//! counts, the unexpected pass/fail lists, and how to render the end-of-run
//! `report.txt`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runner::{RunConfig, TestCaseResult, TestStatus};

/// Accumulated results of a conformance run
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Individual test case results, in run order
    pub cases: Vec<TestCaseResult>,
    /// Tests listed in an exception category that nevertheless matched
    pub passed_unexpectedly: Vec<String>,
    /// Tests covered by no category that failed
    pub failed_unexpectedly: Vec<String>,
    /// Total wall-clock duration
    pub duration: Duration,
}

impl SessionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one case result, maintaining the unexpected-outcome lists.
    pub fn record(&mut self, case: TestCaseResult) {
        match case.status {
            TestStatus::UnexpectedPass => self.passed_unexpectedly.push(case.name.clone()),
            TestStatus::Failed => self.failed_unexpectedly.push(case.name.clone()),
            _ => {}
        }
        self.cases.push(case);
    }

    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Failures of both kinds: output mismatches and stale exception entries.
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed) + self.count(TestStatus::UnexpectedPass)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    pub fn expected_failure_count(&self) -> usize {
        self.count(TestStatus::ExpectedFailure)
    }

    fn count(&self, status: TestStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }

    /// Whether the run is clean: no failures and no stale exception entries.
    pub fn all_passed(&self) -> bool {
        !self
            .cases
            .iter()
            .any(|c| matches!(c.status, TestStatus::Failed | TestStatus::UnexpectedPass))
    }

    /// Format a summary line
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped, {} expected failures ({}ms)",
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.expected_failure_count(),
            self.duration.as_millis(),
        )
    }

    /// Render the full end-of-run report body.
    pub fn render(&self, config: &RunConfig) -> String {
        let mut out = format!(
            "Conformance run completed with {}/{} passing:\n\n",
            self.passed_count(),
            self.total(),
        );
        out.push_str(&format!("Total:             {}\n", self.total()));
        out.push_str(&format!("Passed:            {}\n", self.passed_count()));
        out.push_str(&format!("Failed:            {}\n", self.failed_count()));
        out.push_str(&format!("Skipped:           {}\n", self.skipped_count()));
        out.push_str(&format!(
            "Expected failures: {}\n",
            self.expected_failure_count()
        ));

        out.push_str("\nTests that passed unexpectedly:\n");
        for name in &self.passed_unexpectedly {
            out.push_str(&format!("{}\n", name));
        }
        out.push_str("\nTests that failed unexpectedly:\n");
        for name in &self.failed_unexpectedly {
            out.push_str(&format!("{}\n", name));
        }

        out.push_str("\n## CONFIGURATION ##\n\n");
        out.push_str(&format!("VM:              {}\n", config.vm.display()));
        out.push_str(&format!("Classpath:       {}\n", config.classpath));
        out.push_str(&format!(
            "Test exceptions: {}\n",
            config
                .exceptions_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".into())
        ));
        out.push_str(&format!("Tests directory: {}\n", config.tests_dir.display()));

        out.push_str("\n## EXCEPTION LISTS ##\n");
        for (label, entries) in [
            ("known_failures", &config.exceptions.known_failures),
            (
                "failing_as_unspecified",
                &config.exceptions.failing_as_unspecified,
            ),
            ("unsupported", &config.exceptions.unsupported),
            ("do_not_run", &config.exceptions.do_not_run),
        ] {
            out.push_str(&format!("\n{}:\n", label));
            for entry in entries {
                out.push_str(&format!("{}\n", entry));
            }
        }

        out
    }

    /// Write `report.txt` into `dir`, creating the directory if needed.
    /// Returns the path written.
    pub fn write_to(&self, dir: &Path, config: &RunConfig) -> Result<PathBuf, std::io::Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("report.txt");
        std::fs::write(&path, self.render(config))?;
        Ok(path)
    }
}
