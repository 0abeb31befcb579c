//! Bounded-concurrency runner for bgrunner.
//!
//! A [`Runner`] launches a caller-supplied [`Runnable`] over and over, never
//! letting more than its concurrency limit execute at once:
//!
//! - **Unbounded** runs keep launching until the [`StopSignal`] fires, then
//!   return without waiting for attempts still in flight.
//! - **Finite** runs launch exactly `n` attempts (fewer if stopped first) and
//!   return once every launched attempt has finished.
//!
//! Work failures are reported through `tracing` and counted in the returned
//! [`RunSummary`]; they never abort a run.

mod attempt;
mod runner;
mod stop;
mod work;

pub use attempt::RunSummary;
pub use runner::Runner;
pub use stop::StopSignal;
pub use work::{Runnable, WorkFn, WorkFut, work_fn};

pub use bgrunner_types::{Admission, Concurrency, ConcurrencyError, IterationLimit, WorkError};
