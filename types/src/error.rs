use std::error::Error as StdError;

use thiserror::Error;

/// Failure reported by a single attempt.
///
/// Always non-fatal to the run: the runner logs it, counts it and moves on.
#[derive(Debug, Error)]
pub enum WorkError {
    #[error("{message}")]
    Failed { message: String },
    #[error(transparent)]
    Source(Box<dyn StdError + Send + Sync + 'static>),
    #[error("work panicked: {message}")]
    Panicked { message: String },
}

impl WorkError {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        WorkError::Failed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn other(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        WorkError::Source(source.into())
    }

    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, WorkError::Panicked { .. })
    }
}

impl From<std::io::Error> for WorkError {
    fn from(value: std::io::Error) -> Self {
        WorkError::other(value)
    }
}
