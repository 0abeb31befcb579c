//! The runner and its two run disciplines.
//!
//! ```text
//! launch_and_wait()
//!   ├─ Unbounded:  loop { stop? -> return ; admit ; spawn attempt ; yield }
//!   └─ Finite(n):  for i in 0..n { stop? -> break ; admit ; join_set.spawn(attempt) }
//!                  then join every attempt
//! ```
//!
//! The admission gate is a semaphore sized to the concurrency limit. By
//! default each attempt waits on the gate inside its own task, so the loop
//! never blocks on the gate and the number of spawned-but-waiting attempts in
//! unbounded mode is not capped. [`Admission::BeforeSpawn`] moves the wait
//! into the loop instead.

use std::fmt;
use std::process;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

use bgrunner_config::{CONCURRENCY_ENV_VAR, concurrency_hint};
use bgrunner_types::{Admission, Concurrency, ConcurrencyError, ConcurrencySource, IterationLimit};

use crate::attempt::{RunSummary, Slot, Tally, run_attempt};
use crate::stop::StopSignal;
use crate::work::Runnable;

/// Launches a [`Runnable`] repeatedly with at most `concurrency` attempts
/// executing at once.
pub struct Runner {
    concurrency: Concurrency,
    work: Arc<dyn Runnable>,
    stop: StopSignal,
    iteration_limit: IterationLimit,
    admission: Admission,
}

impl Runner {
    /// A runner that launches until `stop` is triggered.
    ///
    /// A non-positive `concurrency` falls back to [`CONCURRENCY_ENV_VAR`], then
    /// to 1. An unusable hint terminates the process; use
    /// [`try_new`](Self::try_new) to handle it instead.
    #[must_use]
    pub fn new(concurrency: i64, work: Arc<dyn Runnable>, stop: StopSignal) -> Self {
        Self::try_new(concurrency, work, stop).unwrap_or_else(|err| exit_misconfigured(&err))
    }

    /// A runner that makes exactly `iterations` attempts, then waits for them.
    ///
    /// Terminates the process on an unusable concurrency hint, like [`new`](Self::new).
    #[must_use]
    pub fn finite(
        concurrency: i64,
        work: Arc<dyn Runnable>,
        iterations: u64,
        stop: StopSignal,
    ) -> Self {
        Self::try_finite(concurrency, work, iterations, stop)
            .unwrap_or_else(|err| exit_misconfigured(&err))
    }

    pub fn try_new(
        concurrency: i64,
        work: Arc<dyn Runnable>,
        stop: StopSignal,
    ) -> Result<Self, ConcurrencyError> {
        Self::try_with_hint(concurrency, concurrency_hint().as_deref(), work, stop)
    }

    pub fn try_finite(
        concurrency: i64,
        work: Arc<dyn Runnable>,
        iterations: u64,
        stop: StopSignal,
    ) -> Result<Self, ConcurrencyError> {
        Ok(Self::try_new(concurrency, work, stop)?
            .with_iteration_limit(IterationLimit::Finite(iterations)))
    }

    /// Like [`try_new`](Self::try_new), with the environment hint supplied
    /// by the caller instead of read from the process environment.
    pub fn try_with_hint(
        concurrency: i64,
        hint: Option<&str>,
        work: Arc<dyn Runnable>,
        stop: StopSignal,
    ) -> Result<Self, ConcurrencyError> {
        let resolved = Concurrency::resolve(concurrency, hint)?;
        match resolved.source {
            ConcurrencySource::Explicit => {}
            ConcurrencySource::Hint => tracing::info!(
                env_var = CONCURRENCY_ENV_VAR,
                concurrency = %resolved.value,
                "setting concurrency from environment hint"
            ),
            ConcurrencySource::Default => tracing::info!(
                env_var = CONCURRENCY_ENV_VAR,
                concurrency = %resolved.value,
                "concurrency hint is unset, using default concurrency"
            ),
        }

        Ok(Self {
            concurrency: resolved.value,
            work,
            stop,
            iteration_limit: IterationLimit::Unbounded,
            admission: Admission::default(),
        })
    }

    #[must_use]
    pub fn with_iteration_limit(mut self, limit: IterationLimit) -> Self {
        self.iteration_limit = limit;
        self
    }

    #[must_use]
    pub fn with_admission(mut self, admission: Admission) -> Self {
        self.admission = admission;
        self
    }

    #[must_use]
    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    #[must_use]
    pub fn iteration_limit(&self) -> IterationLimit {
        self.iteration_limit
    }

    #[must_use]
    pub fn admission(&self) -> Admission {
        self.admission
    }

    #[must_use]
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Run until stopped (unbounded) or until every attempt has finished (finite).
    ///
    /// Work failures never surface here; they are logged and counted in the
    /// returned [`RunSummary`]. In unbounded mode attempts that were already
    /// launched keep running after this returns.
    pub async fn launch_and_wait(&self) -> RunSummary {
        let permits = self.concurrency.get().min(Semaphore::MAX_PERMITS);
        let gate = Arc::new(Semaphore::new(permits));
        let tally = Arc::new(Tally::default());

        match self.iteration_limit {
            IterationLimit::Unbounded => self.run_unbounded(&gate, &tally).await,
            IterationLimit::Finite(total) => self.run_finite(total, &gate, &tally).await,
        }
    }

    async fn run_unbounded(&self, gate: &Arc<Semaphore>, tally: &Arc<Tally>) -> RunSummary {
        tracing::info!(
            concurrency = %self.concurrency,
            admission = %self.admission,
            "launching attempts until stopped"
        );

        loop {
            if self.stop.is_triggered() {
                break;
            }
            let Some(slot) = self.admit(gate).await else {
                break;
            };

            let index = tally.record_launch();
            // Detached: unbounded mode never joins its attempts.
            task::spawn(run_attempt(
                index,
                Arc::clone(&self.work),
                slot,
                Arc::clone(tally),
            ));

            // Keeps the loop from monopolising a worker; not a wait on the attempt.
            task::yield_now().await;
        }

        let summary = tally.snapshot(true);
        tracing::info!(
            launched = summary.launched,
            in_flight = summary.in_flight(),
            "stop received, no further attempts will be launched"
        );
        summary
    }

    async fn run_finite(
        &self,
        total: u64,
        gate: &Arc<Semaphore>,
        tally: &Arc<Tally>,
    ) -> RunSummary {
        tracing::info!(
            concurrency = %self.concurrency,
            admission = %self.admission,
            total,
            "launching a fixed number of attempts"
        );

        let mut attempts = JoinSet::new();
        let mut stopped = false;

        for _ in 0..total {
            if self.stop.is_triggered() {
                stopped = true;
                break;
            }
            let Some(slot) = self.admit(gate).await else {
                stopped = true;
                break;
            };

            let index = tally.record_launch();
            attempts.spawn(run_attempt(
                index,
                Arc::clone(&self.work),
                slot,
                Arc::clone(tally),
            ));
        }

        if stopped {
            tracing::info!(
                launched = attempts.len(),
                total,
                "stop received before all attempts were launched"
            );
        }

        tracing::info!(
            pending = attempts.len(),
            "waiting on background attempts to finish"
        );
        while let Some(joined) = attempts.join_next().await {
            if let Err(err) = joined {
                tracing::error!(error = %err, "attempt task did not run to completion");
            }
        }

        let summary = tally.snapshot(stopped);
        tracing::info!(
            launched = summary.launched,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "all attempts finished"
        );
        summary
    }

    /// Claim the next attempt's place at the gate according to the admission policy.
    ///
    /// Returns `None` only when a stop notification arrives while the loop
    /// itself is waiting for a permit.
    async fn admit(&self, gate: &Arc<Semaphore>) -> Option<Slot> {
        match self.admission {
            Admission::InAttempt => Some(Slot::Pending(Arc::clone(gate))),
            Admission::BeforeSpawn => {
                tokio::select! {
                    biased;
                    () = self.stop.triggered() => None,
                    permit = Arc::clone(gate).acquire_owned() => permit.ok().map(Slot::Held),
                }
            }
        }
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("concurrency", &self.concurrency)
            .field("iteration_limit", &self.iteration_limit)
            .field("admission", &self.admission)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

fn exit_misconfigured(err: &ConcurrencyError) -> ! {
    tracing::error!(
        env_var = CONCURRENCY_ENV_VAR,
        error = %err,
        "invalid concurrency configuration"
    );
    eprintln!("bgrunner: invalid {CONCURRENCY_ENV_VAR}: {err}");
    process::exit(1)
}
