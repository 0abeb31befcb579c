//! Command-line flags and their merge with the config file.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use bgrunner_config::RunnerConfig;
use bgrunner_types::{Admission, IterationLimit};

const DEFAULT_DURATION_MS: u64 = 100;

#[derive(Debug, Parser)]
#[command(name = "bgrunner", version, about)]
pub struct Args {
    /// Maximum attempts executing at once. Zero or less defers to
    /// BGRUNNER_CONCURRENCY, then to 1.
    #[arg(short, long, allow_negative_numbers = true)]
    pub concurrency: Option<i64>,

    /// Run exactly this many attempts, then exit.
    #[arg(short = 'n', long, conflicts_with = "unbounded")]
    pub iterations: Option<u64>,

    /// Run until interrupted, even if the config file sets `iterations`.
    #[arg(long)]
    pub unbounded: bool,

    /// Where attempts wait for a slot: `in-attempt` or `before-spawn`.
    #[arg(long)]
    pub admission: Option<Admission>,

    /// How long each demo attempt takes.
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Make every n-th demo attempt fail.
    #[arg(long)]
    pub fail_every: Option<u64>,

    /// Config file to read instead of ~/.bgrunner/config.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Effective run settings: flags first, then config file, then defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub concurrency: i64,
    pub iterations: IterationLimit,
    pub admission: Admission,
    pub duration: Duration,
    pub fail_every: Option<u64>,
}

impl Settings {
    #[must_use]
    pub fn resolve(args: &Args, config: Option<&RunnerConfig>) -> Self {
        let runner = config.map(RunnerConfig::runner).unwrap_or_default();
        let work = config.map(RunnerConfig::work).unwrap_or_default();

        let iterations = if args.unbounded {
            IterationLimit::Unbounded
        } else {
            IterationLimit::from(args.iterations.or(runner.iterations))
        };

        Self {
            concurrency: args.concurrency.or(runner.concurrency).unwrap_or(0),
            iterations,
            admission: args.admission.or(runner.admission).unwrap_or_default(),
            duration: Duration::from_millis(
                args.duration_ms
                    .or(work.duration_ms)
                    .unwrap_or(DEFAULT_DURATION_MS),
            ),
            fail_every: args.fail_every.or(work.fail_every),
        }
    }
}
