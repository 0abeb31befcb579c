//! Core domain types for bgrunner.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Both the runner and its configuration layer build on these.

mod concurrency;
mod error;
mod limits;

pub use concurrency::{Concurrency, ConcurrencyError, ConcurrencySource, ResolvedConcurrency};
pub use error::WorkError;
pub use limits::{Admission, IterationLimit, ParseAdmissionError};
