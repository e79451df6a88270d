use anyhow::{Context, bail};
use bruteshark_core::{ConfigError, ResultStore};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::capture::CaptureBackend;
use crate::config::{CaptureConfig, InputSource, RunConfig, resolve_file_list, scan_directory};
use crate::engine::{self, BatchEngine, EngineEvent};
use crate::export;
use crate::report::{Level, ReportSink};
use crate::router;

const EVENT_POLL: Duration = Duration::from_millis(100);

/// Single-fire guard around the export pipeline. Completion and
/// interruption can fire arbitrarily close together; whichever acquires
/// the latch first exports, the other does nothing.
#[derive(Debug, Default)]
pub struct ExportLatch(AtomicBool);

impl ExportLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once over the latch's lifetime.
    pub fn try_acquire(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

/// Terminal condition of the running phase.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Finished,
    Interrupted,
    Fault(String),
}

/// Drives one full run: resolve the input, stream engine notifications
/// through the router and reporter, then export exactly once. Returns
/// `Ok` on completion and on user interruption; configuration errors and
/// engine faults propagate, and a fault does not export.
pub fn run(
    config: &RunConfig,
    engine: BatchEngine,
    backend: &dyn CaptureBackend,
    sink: &dyn ReportSink,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let store = ResultStore::new();
    let latch = ExportLatch::new();

    let outcome = match &config.input {
        InputSource::Capture(capture) => run_live(capture, backend, &store, sink, &cancel)?,
        InputSource::Files(paths) => {
            let files = resolve_file_list(paths, sink);
            run_batch(files, &engine, &store, sink, &cancel)
        }
        InputSource::Directory(dir) => {
            let files = scan_directory(dir)?;
            run_batch(files, &engine, &store, sink, &cancel)
        }
    };

    match outcome {
        // A fault escaping the running phase is reported without an
        // export; only completion and interruption persist results.
        Outcome::Fault(message) => bail!(message),
        Outcome::Finished | Outcome::Interrupted => {
            if latch.try_acquire() {
                export::export_all(&store.snapshot(), config.output_dir.as_deref(), sink);
            }
            sink.emit(Level::Info, "[+] BruteShark finished processing");
            Ok(())
        }
    }
}

fn run_batch(
    files: Vec<PathBuf>,
    engine: &BatchEngine,
    store: &ResultStore,
    sink: &dyn ReportSink,
    cancel: &Arc<AtomicBool>,
) -> Outcome {
    debug!(files = files.len(), "starting batch run");

    let (events_tx, events_rx) = engine::event_channel();
    thread::scope(|scope| {
        let engine_cancel = Arc::clone(cancel);
        scope.spawn(move || engine.process(files, events_tx, engine_cancel));
        drain_events(events_rx, store, sink, cancel)
    })
}

fn run_live(
    capture: &CaptureConfig,
    backend: &dyn CaptureBackend,
    store: &ResultStore,
    sink: &dyn ReportSink,
    cancel: &Arc<AtomicBool>,
) -> anyhow::Result<Outcome> {
    let devices = backend
        .available_devices()
        .context("failed to enumerate capture devices")?;
    if !devices.iter().any(|d| d == &capture.device) {
        return Err(ConfigError::DeviceNotFound(capture.device.clone()).into());
    }

    if let Some(filter) = &capture.filter {
        if !backend.check_filter(filter) {
            return Err(ConfigError::InvalidCaptureFilter(filter.clone()).into());
        }
    }

    let banner = if capture.promiscuous {
        format!(
            "[+] Started analyzing packets from {} (promiscuous mode) - press Ctrl+C to stop",
            capture.device
        )
    } else {
        format!(
            "[+] Started analyzing packets from {} - press Ctrl+C to stop",
            capture.device
        )
    };
    sink.emit(Level::Success, &banner);

    let (events_tx, events_rx) = engine::event_channel();
    let outcome = thread::scope(|scope| {
        let capture_cancel = Arc::clone(cancel);
        let fault_tx = events_tx.clone();
        scope.spawn(move || {
            if let Err(err) = backend.capture(capture, events_tx, capture_cancel) {
                let _ = fault_tx.send(EngineEvent::Fault(format!("{err:#}")));
            }
        });
        drain_events(events_rx, store, sink, cancel)
    });

    Ok(outcome)
}

/// Consumes engine notifications until a terminal event. The cancel flag
/// is checked before every receive, so once an interruption lands no
/// further findings are consumed and the export covers exactly what was
/// inserted up to that point.
fn drain_events(
    events: Receiver<EngineEvent>,
    store: &ResultStore,
    sink: &dyn ReportSink,
    cancel: &AtomicBool,
) -> Outcome {
    loop {
        if cancel.load(Ordering::SeqCst) {
            return Outcome::Interrupted;
        }

        match events.recv_timeout(EVENT_POLL) {
            Ok(EngineEvent::Finding(finding)) => router::route_finding(store, finding, sink),
            Ok(EngineEvent::FileStatus { path, status }) => {
                router::report_file_status(sink, &path, status);
            }
            Ok(EngineEvent::ProcessingFinished) => return Outcome::Finished,
            Ok(EngineEvent::Fault(message)) => return Outcome::Fault(message),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Outcome::Fault("event stream closed unexpectedly".into());
            }
        }
    }
}
