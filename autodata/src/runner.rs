//! Running registered theories and reporting their results
//!
//! Theories are registered explicitly with a [`TheoryRunner`], which runs them
//! sequentially or on a pool of worker threads and prints progress through a
//! [`TestOutputFormatter`] when verbose output is enabled.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crossbeam::channel;

use crate::config::{RunnerConfig, get_global_config};
use crate::error::{ConfigError, DataError};
use crate::signature::Parameters;
use crate::theory::{Theory, TheoryReport, panic_message};

/// A theory that can be run without knowing its argument types
pub trait RunnableTheory: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self) -> Result<TheoryReport, DataError>;
}

impl<Args, F> RunnableTheory for Theory<Args, F>
where
    Args: Parameters,
    F: Fn(Args) + Send + Sync,
{
    fn name(&self) -> &str {
        Theory::name(self)
    }

    fn run(&self) -> Result<TheoryReport, DataError> {
        Theory::run(self)
    }
}

/// Result of one theory, as reported by the runner
#[derive(Debug, Clone, PartialEq)]
pub enum TheoryResult {
    /// Every row passed
    Passed { cases: usize, duration: Duration },
    /// At least one row panicked
    Failed {
        cases: usize,
        failures: Vec<String>,
        duration: Duration,
    },
    /// Rows could not be produced
    Errored { error: DataError },
    /// No source produced a row
    Skipped { reason: String },
}

impl TheoryResult {
    pub fn from_report(report: Result<TheoryReport, DataError>) -> Self {
        match report {
            Err(error) => TheoryResult::Errored { error },
            Ok(report) if report.is_empty() => TheoryResult::Skipped {
                reason: "no data rows".to_string(),
            },
            Ok(report) if report.is_success() => TheoryResult::Passed {
                cases: report.outcomes.len(),
                duration: report.duration,
            },
            Ok(report) => TheoryResult::Failed {
                cases: report.outcomes.len(),
                failures: report.failures().map(|outcome| outcome.to_string()).collect(),
                duration: report.duration,
            },
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TheoryResult::Passed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TheoryResult::Failed { .. })
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, TheoryResult::Errored { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TheoryResult::Skipped { .. })
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            TheoryResult::Passed { duration, .. } => Some(*duration),
            TheoryResult::Failed { duration, .. } => Some(*duration),
            TheoryResult::Errored { .. } | TheoryResult::Skipped { .. } => None,
        }
    }
}

impl fmt::Display for TheoryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheoryResult::Passed { cases, duration } => {
                write!(f, "PASSED ({} cases in {:?})", cases, duration)
            }
            TheoryResult::Failed {
                cases,
                failures,
                duration,
            } => {
                write!(
                    f,
                    "FAILED ({} of {} cases in {:?})",
                    failures.len(),
                    cases,
                    duration
                )?;
                for failure in failures {
                    write!(f, "\n  {}", failure)?;
                }
                Ok(())
            }
            TheoryResult::Errored { error } => write!(f, "ERROR: {}", error),
            TheoryResult::Skipped { reason } => write!(f, "SKIPPED: {}", reason),
        }
    }
}

/// Trait for custom runner output formatting
pub trait TestOutputFormatter: Send + Sync {
    fn format_theory_start(&self, name: &str) -> String;

    fn format_theory_success(&self, name: &str, result: &TheoryResult) -> String;

    /// Format a failed or errored theory
    fn format_theory_failure(&self, name: &str, result: &TheoryResult) -> String;

    fn format_theory_skipped(&self, name: &str, result: &TheoryResult) -> String;

    fn format_result(&self, name: &str, result: &TheoryResult) -> String {
        match result {
            TheoryResult::Passed { .. } => self.format_theory_success(name, result),
            TheoryResult::Skipped { .. } => self.format_theory_skipped(name, result),
            TheoryResult::Failed { .. } | TheoryResult::Errored { .. } => {
                self.format_theory_failure(name, result)
            }
        }
    }
}

/// Output formatter in the style of `cargo test`
pub struct DefaultFormatter;

impl TestOutputFormatter for DefaultFormatter {
    fn format_theory_start(&self, name: &str) -> String {
        format!("theory {} ... ", name)
    }

    fn format_theory_success(&self, _name: &str, result: &TheoryResult) -> String {
        match result {
            TheoryResult::Passed { cases, duration } => {
                format!("ok ({} cases, {:?})", cases, duration)
            }
            _ => "ok".to_string(),
        }
    }

    fn format_theory_failure(&self, _name: &str, result: &TheoryResult) -> String {
        match result {
            TheoryResult::Errored { .. } => "ERROR".to_string(),
            _ => "FAILED".to_string(),
        }
    }

    fn format_theory_skipped(&self, _name: &str, _result: &TheoryResult) -> String {
        "ignored".to_string()
    }
}

/// Output formatter with every failing row spelled out
pub struct VerboseFormatter;

impl TestOutputFormatter for VerboseFormatter {
    fn format_theory_start(&self, name: &str) -> String {
        format!("Running theory: {}", name)
    }

    fn format_theory_success(&self, name: &str, result: &TheoryResult) -> String {
        format!("✓ {} {}", name, result)
    }

    fn format_theory_failure(&self, name: &str, result: &TheoryResult) -> String {
        format!("✗ {} {}", name, result)
    }

    fn format_theory_skipped(&self, name: &str, result: &TheoryResult) -> String {
        format!("- {} {}", name, result)
    }
}

/// Results of a whole run, in registration order
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub results: Vec<(String, TheoryResult)>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(TheoryResult::is_passed)
    }

    pub fn failed(&self) -> usize {
        self.count(TheoryResult::is_failed)
    }

    pub fn errored(&self) -> usize {
        self.count(TheoryResult::is_errored)
    }

    pub fn skipped(&self) -> usize {
        self.count(TheoryResult::is_skipped)
    }

    /// Whether nothing failed or errored
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.errored() == 0
    }

    pub fn get(&self, name: &str) -> Option<&TheoryResult> {
        self.results
            .iter()
            .find(|(theory, _)| theory == name)
            .map(|(_, result)| result)
    }

    /// Panic listing every failed or errored theory
    pub fn assert_success(&self) {
        if self.is_success() {
            return;
        }
        let lines: Vec<String> = self
            .results
            .iter()
            .filter(|(_, result)| result.is_failed() || result.is_errored())
            .map(|(name, result)| format!("{}: {}", name, result))
            .collect();
        panic!(
            "{} of {} theories did not pass:\n{}",
            lines.len(),
            self.total(),
            lines.join("\n")
        );
    }

    fn count(&self, predicate: impl Fn(&TheoryResult) -> bool) -> usize {
        self.results
            .iter()
            .filter(|(_, result)| predicate(result))
            .count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed; {} failed; {} errored; {} ignored; finished in {:?}",
            self.passed(),
            self.failed(),
            self.errored(),
            self.skipped(),
            self.duration
        )
    }
}

/// Runs registered theories
///
/// ```rust
/// use autodata::{InlineAutoData, Theory, TheoryRunner, values};
///
/// let mut runner = TheoryRunner::new();
/// runner.register(
///     Theory::new("doubling", |(n, _label): (u8, String)| {
///         assert_eq!(u16::from(n) * 2, u16::from(n) + u16::from(n));
///     })
///     .case(InlineAutoData::new(values![21u8])),
/// );
///
/// let summary = runner.run();
/// assert_eq!(summary.passed(), 1);
/// summary.assert_success();
/// ```
pub struct TheoryRunner<'a> {
    config: RunnerConfig,
    formatter: Box<dyn TestOutputFormatter>,
    theories: Vec<Box<dyn RunnableTheory + 'a>>,
}

impl<'a> TheoryRunner<'a> {
    /// Runner using the global runner configuration
    pub fn new() -> Self {
        Self::with_config(get_global_config().runner_config)
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        let formatter: Box<dyn TestOutputFormatter> = if config.verbose {
            Box::new(VerboseFormatter)
        } else {
            Box::new(DefaultFormatter)
        };
        Self {
            config,
            formatter,
            theories: Vec::new(),
        }
    }

    pub fn try_with_config(config: RunnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    pub fn with_formatter(mut self, formatter: impl TestOutputFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn register(&mut self, theory: impl RunnableTheory + 'a) -> &mut Self {
        self.theories.push(Box::new(theory));
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn theory(mut self, theory: impl RunnableTheory + 'a) -> Self {
        self.register(theory);
        self
    }

    pub fn len(&self) -> usize {
        self.theories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theories.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.theories.iter().map(|theory| theory.name()).collect()
    }

    /// Run every registered theory
    pub fn run(&self) -> RunSummary {
        let started = Instant::now();
        let workers = self.config.workers.min(self.theories.len());

        let results = if self.config.parallel && workers > 1 {
            self.print_progress(&format!(
                "running {} theories on {} workers",
                self.theories.len(),
                workers
            ));
            let results = self.run_parallel(workers);
            for (theory, result) in self.theories.iter().zip(&results) {
                self.print_result(theory.name(), result);
            }
            results
        } else {
            self.print_progress(&format!("running {} theories", self.theories.len()));
            self.theories
                .iter()
                .map(|theory| {
                    if self.config.verbose {
                        println!("{}", self.formatter.format_theory_start(theory.name()));
                    }
                    let result = execute(theory.as_ref());
                    self.print_result(theory.name(), &result);
                    result
                })
                .collect()
        };

        let summary = RunSummary {
            results: self
                .theories
                .iter()
                .map(|theory| theory.name().to_string())
                .zip(results)
                .collect(),
            duration: started.elapsed(),
        };
        log::debug!("theory run finished: {}", summary);
        self.print_progress(&summary.to_string());
        summary
    }

    fn run_parallel(&self, workers: usize) -> Vec<TheoryResult> {
        let (job_tx, job_rx) = channel::unbounded::<usize>();
        let (result_tx, result_rx) = channel::unbounded::<(usize, TheoryResult)>();
        for index in 0..self.theories.len() {
            if let Err(err) = job_tx.send(index) {
                log::error!("failed to queue theory {}: {}", index, err);
            }
        }
        drop(job_tx);

        let theories = &self.theories;
        crossbeam::scope(|scope| {
            for _ in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move |_| {
                    for index in jobs.iter() {
                        let result = execute(theories[index].as_ref());
                        if results.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        })
        .unwrap_or_else(|payload| panic::resume_unwind(payload));
        drop(result_tx);

        let mut collected: Vec<(usize, TheoryResult)> = result_rx.iter().collect();
        collected.sort_by_key(|(index, _)| *index);
        collected.into_iter().map(|(_, result)| result).collect()
    }

    fn print_result(&self, name: &str, result: &TheoryResult) {
        if self.config.verbose {
            println!("{}", self.formatter.format_result(name, result));
        }
    }

    fn print_progress(&self, message: &str) {
        if self.config.verbose {
            println!("autodata: {}", message);
        }
    }
}

impl Default for TheoryRunner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TheoryRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TheoryRunner")
            .field("config", &self.config)
            .field("theories", &self.names())
            .finish()
    }
}

/// Run one theory, turning a panic outside the body into an error result
fn execute(theory: &dyn RunnableTheory) -> TheoryResult {
    match panic::catch_unwind(AssertUnwindSafe(|| theory.run())) {
        Ok(report) => TheoryResult::from_report(report),
        Err(payload) => TheoryResult::Errored {
            error: DataError::internal(format!(
                "theory {} panicked while producing data: {}",
                theory.name(),
                panic_message(payload.as_ref())
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AutoData, InlineAutoData, InlineData};
    use crate::value::Value;

    fn quiet(parallel: bool) -> RunnerConfig {
        RunnerConfig {
            parallel,
            workers: 4,
            verbose: false,
        }
    }

    fn register_mixed(runner: &mut TheoryRunner<'_>) {
        runner
            .register(
                Theory::new("passes", |(a, b): (i32, i32)| assert_eq!(a + b, b + a))
                    .case(InlineAutoData::new(vec![Value::new(1)]))
                    .case(InlineAutoData::new(vec![Value::new(2), Value::new(3)])),
            )
            .register(
                Theory::new("fails", |(n,): (i32,)| assert!(n > 100, "too small"))
                    .case(InlineData::new(vec![Value::new(7)])),
            )
            .register(
                Theory::new("errors", |(_n,): (i32,)| {})
                    .case(InlineData::new(vec![Value::new(1), Value::new(2)])),
            )
            .register(Theory::new("empty", |(_n,): (i32,)| {}));
    }

    #[test]
    fn test_sequential_run_accounts_every_theory() {
        let mut runner = TheoryRunner::with_config(quiet(false));
        register_mixed(&mut runner);

        let summary = runner.run();
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.errored(), 1);
        assert_eq!(summary.skipped(), 1);
        assert!(!summary.is_success());

        assert_eq!(
            summary.get("errors"),
            Some(&TheoryResult::Errored {
                error: DataError::parameter_count(1, 2)
            })
        );
        match summary.get("fails") {
            Some(TheoryResult::Failed { failures, .. }) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].contains("(7) FAILED: too small"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let mut sequential = TheoryRunner::with_config(quiet(false));
        register_mixed(&mut sequential);
        let mut parallel = TheoryRunner::with_config(quiet(true));
        register_mixed(&mut parallel);

        let expected = sequential.run();
        let actual = parallel.run();

        let names = |summary: &RunSummary| -> Vec<String> {
            summary.results.iter().map(|(name, _)| name.clone()).collect()
        };
        assert_eq!(names(&actual), names(&expected));
        assert_eq!(actual.passed(), expected.passed());
        assert_eq!(actual.failed(), expected.failed());
        assert_eq!(actual.errored(), expected.errored());
        assert_eq!(actual.skipped(), expected.skipped());
    }

    #[test]
    fn test_panicking_data_source_is_an_error() {
        let mut fixture = crate::Fixture::new();
        fixture.register::<u8, _>(|_ctx| panic!("factory exploded"));

        let runner = TheoryRunner::with_config(quiet(false))
            .theory(Theory::new("explodes", |(_n,): (u8,)| {}).case(AutoData::from(fixture)));

        let summary = runner.run();
        match summary.get("explodes") {
            Some(TheoryResult::Errored { error }) => {
                assert!(error.to_string().contains("factory exploded"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "1 of 1 theories did not pass")]
    fn test_assert_success_panics() {
        TheoryRunner::with_config(quiet(false))
            .theory(
                Theory::new("negative", |(n,): (i32,)| assert!(n < 0))
                    .case(InlineData::new(vec![Value::new(5)])),
            )
            .run()
            .assert_success();
    }

    #[test]
    fn test_try_with_config_rejects_zero_workers() {
        let config = RunnerConfig {
            parallel: true,
            workers: 0,
            verbose: false,
        };
        assert_eq!(
            TheoryRunner::try_with_config(config).unwrap_err(),
            ConfigError::InvalidWorkers(0)
        );
    }

    #[test]
    fn test_default_formatter() {
        let formatter = DefaultFormatter;
        let result = TheoryResult::Passed {
            cases: 3,
            duration: Duration::from_millis(5),
        };

        assert_eq!(formatter.format_theory_start("my_theory"), "theory my_theory ... ");
        let success = formatter.format_result("my_theory", &result);
        assert!(success.starts_with("ok"));
        assert!(success.contains("3 cases"));
        assert_eq!(
            formatter.format_result(
                "my_theory",
                &TheoryResult::Errored {
                    error: DataError::internal("boom")
                }
            ),
            "ERROR"
        );
    }

    #[test]
    fn test_verbose_formatter() {
        let formatter = VerboseFormatter;
        let result = TheoryResult::Failed {
            cases: 2,
            failures: vec!["(1) FAILED: nope".to_string()],
            duration: Duration::from_millis(1),
        };

        let failure = formatter.format_result("my_theory", &result);
        assert!(failure.contains("✗"));
        assert!(failure.contains("my_theory"));
        assert!(failure.contains("1 of 2 cases"));
        assert!(failure.contains("(1) FAILED: nope"));
    }

    #[test]
    fn test_theories_may_borrow_local_state() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let runner = TheoryRunner::with_config(quiet(true)).theory(
            Theory::new("counts", |(_n,): (i32,)| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
            .case(InlineData::new(vec![Value::new(1)]))
            .case(InlineData::new(vec![Value::new(2)])),
        );

        assert!(runner.run().is_success());
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(runner.names(), vec!["counts"]);
    }
}
