//! A single attempt: admission, execution, reporting.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use bgrunner_types::WorkError;

use crate::work::Runnable;

/// An attempt's claim on the admission gate.
#[derive(Debug)]
pub(crate) enum Slot {
    /// Not yet admitted; the attempt waits on the gate inside its own task.
    Pending(Arc<Semaphore>),
    /// Admitted by the run loop before the attempt was spawned.
    Held(OwnedSemaphorePermit),
}

impl Slot {
    async fn admit(self) -> Option<OwnedSemaphorePermit> {
        match self {
            Slot::Pending(gate) => gate.acquire_owned().await.ok(),
            Slot::Held(permit) => Some(permit),
        }
    }
}

/// Counters shared between the run loop and its attempts.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    launched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl Tally {
    pub(crate) fn record_launch(&self) -> u64 {
        self.launched.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self, stopped: bool) -> RunSummary {
        RunSummary {
            launched: self.launched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            stopped,
        }
    }
}

/// What a call to [`Runner::launch_and_wait`](crate::Runner::launch_and_wait) did.
///
/// In finite mode every launched attempt has completed by the time this is
/// returned. In unbounded mode `succeeded` and `failed` only cover attempts
/// that had finished when the loop returned; the rest are still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub launched: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// A stop notification ended launching.
    pub stopped: bool,
}

impl RunSummary {
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    #[must_use]
    pub const fn in_flight(&self) -> u64 {
        self.launched.saturating_sub(self.completed())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "launched {}, succeeded {}, failed {}",
            self.launched, self.succeeded, self.failed
        )?;
        if self.in_flight() > 0 {
            write!(f, ", still running {}", self.in_flight())?;
        }
        if self.stopped {
            f.write_str(" (stopped)")?;
        }
        Ok(())
    }
}

/// Wait for admission, run the work once and report the outcome.
///
/// Failures and panics are logged and counted, never propagated. The permit
/// is released only after the outcome is counted.
pub(crate) async fn run_attempt(
    index: u64,
    work: Arc<dyn Runnable>,
    slot: Slot,
    tally: Arc<Tally>,
) {
    let Some(_permit) = slot.admit().await else {
        tracing::debug!(attempt = index, "admission gate closed; attempt skipped");
        return;
    };

    let outcome = AssertUnwindSafe(async { work.run().await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(WorkError::Panicked {
                message: panic_payload_to_string(&payload),
            })
        });

    match outcome {
        Ok(()) => {
            tally.succeeded.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(attempt = index, "attempt succeeded");
        }
        Err(err) => {
            tally.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(attempt = index, error = %err, "error in attempt");
        }
    }
}

fn panic_payload_to_string(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
