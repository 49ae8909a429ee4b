//! Harness errors

use std::fmt;

/// The kind of harness error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An `@NAME` classpath segment referenced an unset environment variable
    MissingEnvVar,
    /// Required configuration is missing or unusable
    Config,
    /// The exception-list file could not be loaded
    ExceptionList,
    /// IO error
    Io,
}

/// A harness error with an optional test context
#[derive(Debug)]
pub struct HarnessError {
    pub kind: ErrorKind,
    pub message: String,
    pub test: Option<String>,
}

impl HarnessError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            test: None,
        }
    }

    /// The canonical missing-variable error for `@NAME` classpath segments.
    pub fn missing_env(name: &str) -> Self {
        Self::new(
            ErrorKind::MissingEnvVar,
            format!("Environment variable {} not set", name),
        )
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg)
    }

    pub fn exception_list(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExceptionList, msg)
    }

    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref test) = self.test {
            write!(f, "{}: ", test)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HarnessError {}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

impl From<serde_yaml::Error> for HarnessError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ExceptionList, e.to_string())
    }
}
