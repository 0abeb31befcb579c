//! Built-in work unit for exercising the runner from the command line.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bgrunner_core::{Runnable, WorkError, WorkFut};

/// Sleeps for a fixed duration; every `fail_every`-th invocation fails.
#[derive(Debug)]
pub struct DemoWork {
    duration: Duration,
    fail_every: Option<u64>,
    invocations: AtomicU64,
}

impl DemoWork {
    #[must_use]
    pub fn new(duration: Duration, fail_every: Option<u64>) -> Self {
        Self {
            duration,
            fail_every: fail_every.filter(|every| *every > 0),
            invocations: AtomicU64::new(0),
        }
    }

    fn should_fail(&self, invocation: u64) -> bool {
        self.fail_every.is_some_and(|every| invocation % every == 0)
    }
}

impl Runnable for DemoWork {
    fn run(&self) -> WorkFut<'_> {
        let invocation = self.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        Box::pin(async move {
            if !self.duration.is_zero() {
                tokio::time::sleep(self.duration).await;
            }
            if self.should_fail(invocation) {
                return Err(WorkError::failed(format!(
                    "simulated failure on invocation {invocation}"
                )));
            }
            Ok(())
        })
    }
}
