//! Configuration for bgrunner.
//!
//! Two sources feed a run:
//!
//! - **Environment hint**: [`CONCURRENCY_ENV_VAR`] supplies a fallback
//!   concurrency when the caller passes a non-positive limit.
//! - **Config file**: optional TOML at `~/.bgrunner/config.toml` with
//!   `[runner]` and `[work]` tables, read by the CLI.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use bgrunner_types::Admission;

/// Environment variable consulted when no positive concurrency was requested.
pub const CONCURRENCY_ENV_VAR: &str = "BGRUNNER_CONCURRENCY";

/// Raw value of [`CONCURRENCY_ENV_VAR`], if set.
///
/// Non-UTF-8 values are returned lossily so they fail parsing instead of
/// being mistaken for an unset variable.
#[must_use]
pub fn concurrency_hint() -> Option<String> {
    env::var_os(CONCURRENCY_ENV_VAR).map(|raw| raw.to_string_lossy().into_owned())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    pub runner: Option<RunnerSection>,
    pub work: Option<WorkSection>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerSection {
    /// Non-positive (or absent) defers to the environment hint.
    pub concurrency: Option<i64>,
    /// Absent means run until stopped.
    pub iterations: Option<u64>,
    pub admission: Option<Admission>,
}

/// Settings for the CLI's built-in demo work unit.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkSection {
    pub duration_ms: Option<u64>,
    /// Every n-th attempt reports a failure. Zero or absent disables.
    pub fail_every: Option<u64>,
}

impl RunnerConfig {
    /// Load from the default location. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn runner(&self) -> RunnerSection {
        self.runner.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn work(&self) -> WorkSection {
        self.work.clone().unwrap_or_default()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bgrunner").join("config.toml"))
}
