//! Theories: test bodies run once per row of their data sources.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::error::DataError;
use crate::signature::{Parameters, Signature};
use crate::source::{DataRequest, DataSource};
use crate::value::format_row;

/// Outcome of invoking a theory with one row of arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Description of the source that produced the row
    pub source: String,
    /// The rendered arguments, e.g. `(1337, 7, 42)`
    pub arguments: String,
    /// Panic message when the body failed
    pub failure: Option<String>,
    pub duration: Duration,
}

impl CaseOutcome {
    pub fn is_passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            None => write!(f, "{} ok ({:?})", self.arguments, self.duration),
            Some(message) => write!(f, "{} FAILED: {}", self.arguments, message),
        }
    }
}

/// All outcomes of one theory run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoryReport {
    pub name: String,
    pub outcomes: Vec<CaseOutcome>,
    pub duration: Duration,
}

impl TheoryReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_failed()).count()
    }

    /// Whether no row was produced at all
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether every produced row passed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failed())
    }

    /// Panic with every failing case when the run was not a success
    pub fn assert_passes(&self) {
        if self.is_success() {
            return;
        }
        let lines: Vec<String> = self
            .failures()
            .map(|outcome| format!("  {} from {}", outcome, outcome.source))
            .collect();
        panic!(
            "Theory {} failed for {} of {} case(s):\n{}",
            self.name,
            self.failed(),
            self.outcomes.len(),
            lines.join("\n")
        );
    }
}

/// A test body declared over an argument tuple, with its data sources
///
/// ```rust
/// use autodata::{InlineAutoData, Theory, values};
///
/// let report = Theory::new("sum_is_commutative", |(a, b, c): (i32, i32, i32)| {
///     assert_eq!(a + b + c, c + b + a);
/// })
/// .case(InlineAutoData::new(values![1337, 7]))
/// .case(InlineAutoData::new(values![1, 2, 3]))
/// .run()
/// .unwrap();
///
/// assert_eq!(report.passed(), 2);
/// ```
pub struct Theory<Args, F> {
    name: String,
    signature: Signature,
    cases: Vec<Box<dyn DataSource>>,
    body: F,
    _args: PhantomData<fn(Args)>,
}

impl<Args, F> Theory<Args, F>
where
    Args: Parameters,
    F: Fn(Args) + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            signature: Args::signature(),
            cases: Vec::new(),
            body,
            _args: PhantomData,
        }
    }

    /// Add a data source; every row it produces becomes one invocation
    pub fn case(mut self, source: impl DataSource + 'static) -> Self {
        self.cases.push(Box::new(source));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Check every case against the signature without producing any data
    pub fn validate(&self) -> Result<(), DataError> {
        for case in &self.cases {
            case.validate(&self.signature).inspect_err(|err| {
                log::debug!("theory {}: {} rejected: {}", self.name, case.describe(), err);
            })?;
        }
        Ok(())
    }

    /// Invoke the body once per row of every case
    ///
    /// Data errors abort the run. Panics in the body are recorded as failed
    /// outcomes.
    pub fn run(&self) -> Result<TheoryReport, DataError> {
        self.validate()?;
        let started = Instant::now();
        let mut outcomes = Vec::new();

        for case in &self.cases {
            let source = case.describe();
            let rows = case.rows(&DataRequest::new(&self.signature))?;
            log::debug!("{} produced {} row(s)", source, rows.len());
            for row in rows {
                self.signature.check_row(&row)?;
                let arguments = format_row(&row);
                let args = Args::from_row(row)?;

                let case_started = Instant::now();
                let result = panic::catch_unwind(AssertUnwindSafe(|| (self.body)(args)));
                let failure = result.err().map(|payload| panic_message(payload.as_ref()));
                if let Some(message) = &failure {
                    log::debug!("theory {} failed for {}: {}", self.name, arguments, message);
                }

                outcomes.push(CaseOutcome {
                    source: source.clone(),
                    arguments,
                    failure,
                    duration: case_started.elapsed(),
                });
            }
        }

        Ok(TheoryReport {
            name: self.name.clone(),
            outcomes,
            duration: started.elapsed(),
        })
    }
}

impl<Args, F> fmt::Debug for Theory<Args, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cases: Vec<String> = self.cases.iter().map(|case| case.describe()).collect();
        f.debug_struct("Theory")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("cases", &cases)
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "theory panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use crate::source::{AutoData, InlineAutoData, InlineData};
    use crate::value::Value;
    use crate::value::Row;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Source yielding fixed rows and counting validations
    struct Counted {
        rows: Vec<i32>,
        validations: Arc<AtomicUsize>,
    }

    impl DataSource for Counted {
        fn rows(&self, _request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
            Ok(self.rows.iter().map(|&n| vec![Value::new(n)]).collect())
        }

        fn validate(&self, _signature: &Signature) -> Result<(), DataError> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_runs_once_per_row() {
        let seen = Mutex::new(Vec::new());
        let theory = Theory::new("collect", |(a, b): (i32, String)| {
            seen.lock().unwrap().push((a, b));
        })
        .case(InlineData::new(vec![Value::new(1), Value::new("x".to_string())]))
        .case(InlineAutoData::new(vec![Value::new(2)]));

        let report = theory.run().unwrap();
        assert_eq!(report.passed(), 2);
        assert!(report.is_success());

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen[0], (1, "x".to_string()));
        assert_eq!(seen[1].0, 2);
        assert_eq!(seen[1].1.len(), 32);
    }

    #[test]
    fn test_panics_are_recorded_as_failures() {
        let theory = Theory::new("always_small", |(n,): (u8,)| {
            assert!(n < 10, "{} is too large", n);
        })
        .case(InlineData::new(vec![Value::new(3u8)]))
        .case(InlineData::new(vec![Value::new(200u8)]));

        let report = theory.run().unwrap();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.arguments, "(200)");
        assert_eq!(failure.failure.as_deref(), Some("200 is too large"));
        assert_eq!(failure.source, "InlineData(200)");
    }

    #[test]
    fn test_excess_literals_abort_before_any_invocation() {
        let calls = Mutex::new(0);
        let theory = Theory::new("pair", |(_a, _b): (i32, i32)| {
            *calls.lock().unwrap() += 1;
        })
        .case(InlineAutoData::new(vec![Value::new(1)]))
        .case(InlineAutoData::new(vec![
            Value::new(1),
            Value::new(2),
            Value::new(3),
        ]));

        assert_eq!(theory.validate(), Err(DataError::parameter_count(2, 3)));
        assert_eq!(theory.run().unwrap_err(), DataError::parameter_count(2, 3));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_customized_generation_reaches_the_body() {
        let mut fixture = Fixture::new();
        fixture.inject(42i32);

        let theory = Theory::new("answer", |(x, y, z): (i32, i32, i32)| {
            assert_eq!((x, y, z), (1337, 7, 42));
        })
        .case(InlineAutoData::with_fixture(
            fixture,
            vec![Value::new(1337), Value::new(7)],
        ));

        theory.run().unwrap().assert_passes();
    }

    #[test]
    fn test_theory_without_cases_produces_empty_report() {
        let theory = Theory::new("nothing", |_: (bool,)| {});
        let report = theory.run().unwrap();
        assert!(report.is_empty());
        assert!(report.is_success());
    }

    #[test]
    #[should_panic(expected = "Theory odd failed for 1 of 1 case(s)")]
    fn test_assert_passes_panics_on_failure() {
        Theory::new("odd", |(n,): (i32,)| assert_eq!(n % 2, 1))
            .case(InlineData::new(vec![Value::new(4)]))
            .run()
            .unwrap()
            .assert_passes();
    }

    #[test]
    fn test_debug_lists_cases() {
        let theory = Theory::new("debug", |_: (i32,)| {}).case(AutoData::new());
        let rendered = format!("{:?}", theory);
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("AutoData"));
        assert_eq!(theory.case_count(), 1);
    }

    #[test]
    fn test_each_case_is_validated_once() {
        let validations = Arc::new(AtomicUsize::new(0));
        let theory = Theory::new("counted", |(n,): (i32,)| assert!(n > 0))
            .case(Counted {
                rows: vec![1, 2, 3],
                validations: Arc::clone(&validations),
            })
            .case(Counted {
                rows: vec![4],
                validations: Arc::clone(&validations),
            });

        let report = theory.run().unwrap();
        assert_eq!(report.passed(), 4);
        assert_eq!(validations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rows_are_checked_against_the_signature() {
        let theory = Theory::new("typed", |(_s,): (String,)| {}).case(Counted {
            rows: vec![1],
            validations: Arc::new(AtomicUsize::new(0)),
        });

        let err = theory.run().unwrap_err();
        assert_eq!(
            err,
            DataError::type_mismatch(0, "alloc::string::String", "i32")
        );
    }

}
