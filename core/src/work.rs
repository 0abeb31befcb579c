//! The work capability a runner launches.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bgrunner_types::WorkError;

/// Work execution future type alias.
pub type WorkFut<'a> = Pin<Box<dyn Future<Output = Result<(), WorkError>> + Send + 'a>>;

/// One repeatable unit of work.
///
/// The runner invokes `run` concurrently with itself, up to the configured
/// concurrency. Guarding any state shared between invocations is the
/// implementor's job.
pub trait Runnable: Send + Sync {
    fn run(&self) -> WorkFut<'_>;
}

impl<T: Runnable + ?Sized> Runnable for Arc<T> {
    fn run(&self) -> WorkFut<'_> {
        (**self).run()
    }
}

/// Adapts a closure returning a future into a [`Runnable`].
#[derive(Clone)]
pub struct WorkFn<F> {
    f: F,
}

/// Build a [`Runnable`] from `|| async { ... }`.
#[must_use]
pub fn work_fn<F, Fut>(f: F) -> WorkFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    WorkFn { f }
}

impl<F, Fut> Runnable for WorkFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    fn run(&self) -> WorkFut<'_> {
        Box::pin((self.f)())
    }
}

impl<F> fmt::Debug for WorkFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkFn").finish_non_exhaustive()
    }
}
