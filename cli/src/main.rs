//! bgrunner CLI - runs a demo work unit under the bounded-concurrency runner.
//!
//! # Flow
//!
//! ```text
//! main() -> init_tracing() -> Settings::resolve(flags, config file)
//!        -> Runner::{new,finite}() -> launch_and_wait() -> print RunSummary
//!                     ^
//!          Ctrl-C ----+ (StopSignal::trigger)
//! ```
//!
//! An unusable `BGRUNNER_CONCURRENCY` hint terminates the process during
//! runner construction.

mod demo;
mod settings;

use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bgrunner_config::RunnerConfig;
use bgrunner_core::{IterationLimit, Runner, StopSignal};

use demo::DemoWork;
use settings::{Args, Settings};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .with(env_filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Option<RunnerConfig>> {
    let loaded = match path {
        Some(path) => RunnerConfig::load_from(path),
        None => RunnerConfig::load(),
    };
    loaded.context("failed to load bgrunner config")
}

/// Forward the first Ctrl-C to the runner's stop signal.
fn stop_on_ctrl_c(stop: StopSignal) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping");
                stop.trigger();
            }
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {e}"),
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(&args, config.as_ref());

    let stop = StopSignal::new();
    stop_on_ctrl_c(stop.clone());

    let work = Arc::new(DemoWork::new(settings.duration, settings.fail_every));
    let runner = match settings.iterations {
        IterationLimit::Finite(n) => Runner::finite(settings.concurrency, work, n, stop),
        IterationLimit::Unbounded => Runner::new(settings.concurrency, work, stop),
    }
    .with_admission(settings.admission);

    let summary = runner.launch_and_wait().await;
    println!("{summary}");

    Ok(())
}
