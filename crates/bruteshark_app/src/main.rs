//! BruteShark CLI - network forensics result aggregation and export.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

use bruteshark::capture::SysNetBackend;
use bruteshark::config::{Args, RunConfig};
use bruteshark::controller;
use bruteshark::engine::{BatchEngine, builtin_analyzers, select_analyzers};
use bruteshark::report::ConsoleSink;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // The handler only flips the flag; the controller observes it, runs
    // the export and exits, so a second Ctrl+C changes nothing.
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_cancel = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        handler_cancel.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    let config = RunConfig::from_args(args)?;
    let engine = BatchEngine::new(select_analyzers(builtin_analyzers(), &config.modules));
    let backend = SysNetBackend::new();
    let sink = ConsoleSink::new();

    controller::run(&config, engine, &backend, &sink, cancel)
}
