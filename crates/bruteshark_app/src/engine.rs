use bruteshark_core::{FileStatus, Finding, ModuleKind, ModuleSet};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, warn};

const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Notifications flowing from the engine to the run controller. Events
/// for one input file arrive in order; no order is promised across files.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Finding(Finding),
    FileStatus { path: PathBuf, status: FileStatus },
    ProcessingFinished,
    Fault(String),
}

pub fn event_channel() -> (Sender<EngineEvent>, Receiver<EngineEvent>) {
    bounded(EVENT_CHANNEL_CAPACITY)
}

/// Handle through which analyzers report findings.
pub struct FindingSink<'a> {
    events: &'a Sender<EngineEvent>,
}

impl FindingSink<'_> {
    pub fn push(&self, finding: Finding) {
        let _ = self.events.send(EngineEvent::Finding(finding));
    }
}

/// One analysis module working on capture-file contents. Implementations
/// are supplied by dissector crates; this layer only runs them.
pub trait FileAnalyzer: Send + Sync {
    fn module(&self) -> ModuleKind;

    /// Inspects one file and pushes any findings into the sink. An error
    /// marks this file as failed without stopping the batch.
    fn analyze(&self, path: &Path, data: &[u8], sink: &FindingSink<'_>) -> anyhow::Result<()>;
}

/// Worker pool that runs the registered analyzers over a batch of capture
/// files. Each worker owns one file end-to-end, so the started line, the
/// file's findings and its finished/failed line keep their order.
/// `ProcessingFinished` is sent only after every worker has drained.
pub struct BatchEngine {
    analyzers: Arc<Vec<Box<dyn FileAnalyzer>>>,
    workers: usize,
}

impl BatchEngine {
    pub fn new(analyzers: Vec<Box<dyn FileAnalyzer>>) -> Self {
        Self {
            analyzers: Arc::new(analyzers),
            workers: num_cpus::get(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Processes the file set to completion. Blocks until every worker
    /// has exited; cancellation is observed between files.
    pub fn process(&self, files: Vec<PathBuf>, events: Sender<EngineEvent>, cancel: Arc<AtomicBool>) {
        debug!(files = files.len(), workers = self.workers, "batch engine starting");

        let (job_tx, job_rx) = unbounded::<PathBuf>();
        for file in files {
            let _ = job_tx.send(file);
        }
        drop(job_tx);

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let jobs = job_rx.clone();
            let worker_events = events.clone();
            let analyzers = Arc::clone(&self.analyzers);
            let cancel = Arc::clone(&cancel);

            let handle = thread::Builder::new()
                .name(format!("analysis-{worker_id}"))
                .spawn(move || worker(jobs, worker_events, &analyzers, &cancel))
                .expect("failed to spawn analysis worker");
            handles.push(handle);
        }
        drop(job_rx);

        let mut panicked = false;
        for handle in handles {
            if handle.join().is_err() {
                panicked = true;
            }
        }

        if panicked {
            let _ = events.send(EngineEvent::Fault("analysis worker panicked".into()));
        } else {
            let _ = events.send(EngineEvent::ProcessingFinished);
        }
    }
}

fn worker(
    jobs: Receiver<PathBuf>,
    events: Sender<EngineEvent>,
    analyzers: &[Box<dyn FileAnalyzer>],
    cancel: &AtomicBool,
) {
    for path in jobs {
        if cancel.load(Ordering::SeqCst) {
            break;
        }

        let _ = events.send(EngineEvent::FileStatus {
            path: path.clone(),
            status: FileStatus::Started,
        });

        let status = match std::fs::read(&path) {
            Ok(data) => {
                debug!(file = %path.display(), bytes = data.len(), "analyzing");
                let sink = FindingSink { events: &events };
                let mut failed = false;
                for analyzer in analyzers {
                    if let Err(err) = analyzer.analyze(&path, &data, &sink) {
                        warn!(
                            module = %analyzer.module(),
                            file = %path.display(),
                            "analyzer failed: {err:#}"
                        );
                        failed = true;
                    }
                }
                if failed {
                    FileStatus::Failed
                } else {
                    FileStatus::Finished
                }
            }
            Err(err) => {
                warn!(file = %path.display(), "read failed: {err}");
                FileStatus::Failed
            }
        };

        let _ = events.send(EngineEvent::FileStatus { path, status });
    }
}

/// Analyzer implementations bundled with the CLI. Dissector crates supply
/// the actual protocol analysis; the aggregation layer ships none of its
/// own.
pub fn builtin_analyzers() -> Vec<Box<dyn FileAnalyzer>> {
    Vec::new()
}

/// Keeps only the analyzers whose module is part of the run's selection.
pub fn select_analyzers(
    analyzers: Vec<Box<dyn FileAnalyzer>>,
    modules: &ModuleSet,
) -> Vec<Box<dyn FileAnalyzer>> {
    analyzers
        .into_iter()
        .filter(|analyzer| modules.contains(&analyzer.module()))
        .collect()
}
