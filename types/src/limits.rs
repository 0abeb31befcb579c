//! Run discipline and admission policy.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// How many attempts a run makes before it reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterationLimit {
    /// Keep launching until stopped.
    #[default]
    Unbounded,
    /// Launch exactly this many attempts, then wait for all of them.
    /// `Finite(0)` launches nothing.
    Finite(u64),
}

impl IterationLimit {
    #[must_use]
    pub const fn is_finite(self) -> bool {
        matches!(self, IterationLimit::Finite(_))
    }
}

impl From<Option<u64>> for IterationLimit {
    fn from(value: Option<u64>) -> Self {
        value.map_or(IterationLimit::Unbounded, IterationLimit::Finite)
    }
}

/// Where an attempt waits for its slot in the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Admission {
    /// The attempt is spawned immediately and waits for a slot inside its own
    /// task. Executing attempts are capped; spawned-but-waiting attempts are not.
    #[default]
    InAttempt,
    /// The run loop waits for a slot before spawning, so spawned attempts
    /// never outnumber the concurrency limit.
    BeforeSpawn,
}

impl Admission {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Admission::InAttempt => "in-attempt",
            Admission::BeforeSpawn => "before-spawn",
        }
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown admission policy {0:?} (expected \"in-attempt\" or \"before-spawn\")")]
pub struct ParseAdmissionError(String);

impl FromStr for Admission {
    type Err = ParseAdmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-attempt" => Ok(Admission::InAttempt),
            "before-spawn" => Ok(Admission::BeforeSpawn),
            other => Err(ParseAdmissionError(other.to_string())),
        }
    }
}
