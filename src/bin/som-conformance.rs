//! som-conformance CLI
//!
//! Run SOM conformance tests against a VM executable. Required settings can
//! come from flags or from the environment (`EXECUTABLE`, `CLASSPATH`);
//! `TEST_EXCEPTIONS`, `GENERATE_REPORT` and `DEBUG` are optional.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use som_conformance::{ExceptionsMode, RunConfig, TestExceptions, TestRunner, TestStatus};

#[derive(Parser, Debug)]
#[command(name = "som-conformance")]
#[command(version)]
#[command(about = "Run SOM conformance tests against a VM")]
struct Cli {
    /// Directory containing .som test programs
    #[arg(default_value = "Tests")]
    tests: PathBuf,

    /// VM executable under test (fallback: EXECUTABLE env var)
    #[arg(long)]
    vm: Option<PathBuf>,

    /// Default classpath passed as -cp (fallback: CLASSPATH env var)
    #[arg(long)]
    classpath: Option<String>,

    /// YAML exception list (fallback: TEST_EXCEPTIONS env var)
    #[arg(long)]
    exceptions: Option<PathBuf>,

    /// Treat an empty exception document as a configuration error
    #[arg(long)]
    strict_exceptions: bool,

    /// Directory to write report.txt into (fallback: GENERATE_REPORT env var)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Only run tests whose path contains this string
    #[arg(short = 'f', long)]
    filter: Option<String>,

    /// Test file extension
    #[arg(long = "ext", default_value = ".som")]
    extension: String,

    /// Verbose output: show per-case execution logs (fallback: DEBUG env var)
    #[arg(short, long)]
    verbose: bool,

    /// Show the number of discovered tests without running
    #[arg(long)]
    count: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let vm = cli
        .vm
        .or_else(|| std::env::var_os("EXECUTABLE").map(PathBuf::from))
        .context("no VM executable: pass --vm or set EXECUTABLE")?;
    let classpath = cli
        .classpath
        .or_else(|| std::env::var("CLASSPATH").ok())
        .context("no classpath: pass --classpath or set CLASSPATH")?;

    let exceptions_path = cli
        .exceptions
        .or_else(|| std::env::var_os("TEST_EXCEPTIONS").map(PathBuf::from));
    let mode = if cli.strict_exceptions {
        ExceptionsMode::Strict
    } else {
        ExceptionsMode::Lenient
    };
    // Entries in the file are relative to the tests directory's parent, so
    // they line up with the paths discovery produces.
    let base = cli
        .tests
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let exceptions = match &exceptions_path {
        Some(path) => TestExceptions::load(path, mode)
            .with_context(|| format!("failed to load exception list {}", path.display()))?
            .resolved_against(&base),
        None => TestExceptions::default(),
    };

    let report_dir = cli
        .report
        .or_else(|| std::env::var_os("GENERATE_REPORT").map(PathBuf::from));
    let verbose = cli.verbose
        || std::env::var("DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

    let config = RunConfig {
        tests_dir: cli.tests,
        vm,
        classpath,
        exceptions,
        exceptions_path,
        report_dir,
        filter: cli.filter,
        extension: cli.extension,
        verbose,
    };
    let runner = TestRunner::new(config);

    if cli.count {
        let count = runner.discover().context("test discovery failed")?.len();
        println!("Found {} test(s)", count);
        return Ok(ExitCode::SUCCESS);
    }

    let report = runner.run_all().context("conformance run failed")?;

    for case in &report.cases {
        let millis = case.duration.as_millis();
        match case.status {
            TestStatus::Passed => println!("PASS  {} ({}ms)", case.name, millis),
            TestStatus::ExpectedFailure => println!("XFAIL {} ({}ms)", case.name, millis),
            TestStatus::Skipped => println!(
                "SKIP  {} - {}",
                case.name,
                case.message.as_deref().unwrap_or("")
            ),
            TestStatus::Failed => {
                println!("FAIL  {}", case.name);
                print_indented(case.message.as_deref().unwrap_or(""));
            }
            TestStatus::UnexpectedPass => {
                println!("UPASS {}", case.name);
                print_indented(case.message.as_deref().unwrap_or(""));
            }
        }
        if runner.config().verbose && !case.log.is_empty() {
            println!("      --- log ---");
            print_indented(&case.log);
        }
    }

    println!();
    println!("{}", report.summary());

    if let Some(ref dir) = runner.config().report_dir {
        let path = report
            .write_to(dir, runner.config())
            .with_context(|| format!("failed to write report into {}", dir.display()))?;
        println!("report written to {}", path.display());
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_indented(text: &str) {
    for line in text.lines() {
        println!("      {}", line);
    }
}
