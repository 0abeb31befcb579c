//! Concurrency limit resolution.
//!
//! A [`Concurrency`] is always at least 1. Callers hand in a raw integer where
//! anything non-positive means "pick for me"; the fallback comes from an
//! environment-provided hint, then from [`Concurrency::DEFAULT`].

use std::fmt;
use std::num::NonZeroUsize;

use thiserror::Error;

/// Maximum number of attempts allowed to execute at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Concurrency(NonZeroUsize);

/// Where a resolved [`Concurrency`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencySource {
    /// The caller asked for a positive value.
    Explicit,
    /// The caller deferred and the environment hint supplied the value.
    Hint,
    /// The caller deferred and no hint was present.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConcurrency {
    pub value: Concurrency,
    pub source: ConcurrencySource,
}

/// A concurrency hint that cannot produce a usable limit.
///
/// This is a deployment misconfiguration. There is no recovery path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConcurrencyError {
    #[error("concurrency hint {value:?} is not an integer")]
    InvalidHint { value: String },
    #[error("concurrency hint {value} must be positive")]
    NonPositiveHint { value: i64 },
}

impl Concurrency {
    pub const DEFAULT: Self = Self(NonZeroUsize::MIN);

    #[must_use]
    pub const fn new(value: NonZeroUsize) -> Self {
        Self(value)
    }

    /// Returns `None` for zero.
    #[must_use]
    pub fn from_usize(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Resolve a requested limit against an optional hint.
    ///
    /// A positive `requested` wins outright and the hint is never inspected.
    /// Otherwise an absent or empty hint yields [`Concurrency::DEFAULT`] and a
    /// positive integer hint is used as-is. Anything else is an error,
    /// surrounding whitespace included.
    pub fn resolve(
        requested: i64,
        hint: Option<&str>,
    ) -> Result<ResolvedConcurrency, ConcurrencyError> {
        if requested > 0 {
            return Ok(ResolvedConcurrency {
                value: Self::saturating_from_positive(requested),
                source: ConcurrencySource::Explicit,
            });
        }

        let Some(raw) = hint.filter(|raw| !raw.is_empty()) else {
            return Ok(ResolvedConcurrency {
                value: Self::DEFAULT,
                source: ConcurrencySource::Default,
            });
        };

        let parsed: i64 = raw.parse().map_err(|_| ConcurrencyError::InvalidHint {
            value: raw.to_string(),
        })?;
        if parsed <= 0 {
            return Err(ConcurrencyError::NonPositiveHint { value: parsed });
        }

        Ok(ResolvedConcurrency {
            value: Self::saturating_from_positive(parsed),
            source: ConcurrencySource::Hint,
        })
    }

    fn saturating_from_positive(value: i64) -> Self {
        let value = usize::try_from(value).unwrap_or(usize::MAX);
        Self::from_usize(value).unwrap_or(Self::DEFAULT)
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<NonZeroUsize> for Concurrency {
    fn from(value: NonZeroUsize) -> Self {
        Self(value)
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
