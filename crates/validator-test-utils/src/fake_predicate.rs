//! Scripted predicates.

use setup_validator::{Outcome, Predicate, PredicateError};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a fake predicate does on a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Succeed,
    Fail,
    /// Return an execution error (as if the command were missing).
    Error,
}

/// Predicate returning scripted results and counting invocations.
///
/// Cycles through its steps; the call counter is shared so it can be read
/// after the predicate has been moved into a `TestCase`.
#[derive(Debug, Clone)]
pub struct FakePredicate {
    steps: Vec<Step>,
    calls: Arc<AtomicUsize>,
}

impl FakePredicate {
    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            steps,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_steps(vec![Step::Succeed])
    }

    pub fn failing() -> Self {
        Self::with_steps(vec![Step::Fail])
    }

    pub fn erroring() -> Self {
        Self::with_steps(vec![Step::Error])
    }

    /// Handle to the invocation counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Predicate for FakePredicate {
    async fn check(&self) -> Result<Outcome, PredicateError> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst);

        if self.steps.is_empty() {
            return Ok(Outcome::Success);
        }

        match self.steps[count % self.steps.len()] {
            Step::Succeed => Ok(Outcome::Success),
            Step::Fail => Ok(Outcome::Failure),
            Step::Error => Err(PredicateError::Spawn {
                program: "fake".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "fake command not found"),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("fake({:?})", self.steps)
    }
}
