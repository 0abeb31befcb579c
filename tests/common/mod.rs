//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use bgrunner_core::{Runnable, StopSignal, WorkError, WorkFut};

/// Instrumented work unit: counts invocations, tracks peak overlap, and can
/// fail or trigger a stop signal after a number of calls.
#[derive(Default)]
pub struct Probe {
    calls: AtomicU64,
    current: AtomicUsize,
    peak: AtomicUsize,
    hold: Duration,
    fail: bool,
    stop_after: Option<(u64, StopSignal)>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn stopping_after(mut self, calls: u64, stop: StopSignal) -> Self {
        self.stop_after = Some((calls, stop));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Runnable for Probe {
    fn run(&self) -> WorkFut<'_> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if let Some((after, stop)) = &self.stop_after
                && call >= *after
            {
                stop.trigger();
            }
            if !self.hold.is_zero() {
                tokio::time::sleep(self.hold).await;
            }

            self.current.fetch_sub(1, Ordering::SeqCst);
            if self.fail {
                Err(WorkError::failed(format!("probe failure {call}")))
            } else {
                Ok(())
            }
        })
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// The compiled `bgrunner` binary with a clean environment: no concurrency
/// hint, quiet logs, and `scratch` as the home directory so no user config
/// file is picked up.
pub fn bgrunner(scratch: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bgrunner"));
    cmd.env_remove(bgrunner_config::CONCURRENCY_ENV_VAR)
        .env("RUST_LOG", "warn")
        .env("HOME", scratch)
        .env("USERPROFILE", scratch);
    cmd
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
