//! The predicate capability.
//!
//! The runner knows nothing about kubectl, helm or argocd. It only sees
//! "something that can be invoked and yields success or failure". Concrete
//! implementations live next to this trait ([`FnPredicate`]) and in the
//! [`command`](crate::command) and [`eventual`](crate::eventual) modules.

use crate::case::Outcome;
use crate::errors::PredicateError;

/// A zero-argument check producing a success/failure signal.
///
/// An `Err` means the check could not be executed at all. Callers treat it
/// exactly like `Ok(Outcome::Failure)`; the error only feeds diagnostics.
#[async_trait::async_trait]
pub trait Predicate: Send + Sync {
    /// Invoke the check once.
    async fn check(&self) -> Result<Outcome, PredicateError>;

    /// Short human-readable description used in logs.
    fn describe(&self) -> String {
        "predicate".to_string()
    }
}

#[async_trait::async_trait]
impl<P: Predicate + ?Sized> Predicate for Box<P> {
    async fn check(&self) -> Result<Outcome, PredicateError> {
        (**self).check().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Adapts a synchronous closure into a predicate.
pub struct FnPredicate<F> {
    f: F,
}

impl<F> FnPredicate<F>
where
    F: Fn() -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait::async_trait]
impl<F> Predicate for FnPredicate<F>
where
    F: Fn() -> bool + Send + Sync,
{
    async fn check(&self) -> Result<Outcome, PredicateError> {
        Ok(Outcome::from_bool((self.f)()))
    }

    fn describe(&self) -> String {
        "closure".to_string()
    }
}
