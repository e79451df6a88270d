use crossbeam_channel::Sender;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::config::CaptureConfig;
use crate::engine::EngineEvent;

const CANCEL_POLL: Duration = Duration::from_millis(200);

/// Boundary to the live acquisition engine. Implementations advertise
/// their devices, decide filter validity, and block in [`capture`] until
/// the run is cancelled.
///
/// [`capture`]: CaptureBackend::capture
pub trait CaptureBackend: Send + Sync {
    fn available_devices(&self) -> io::Result<Vec<String>>;

    /// True when the engine accepts `filter` as a capture filter.
    fn check_filter(&self, filter: &str) -> bool;

    /// Runs one capture session, writing notifications into `events`.
    /// Returns after `cancel` is set, or early on a fatal engine error.
    fn capture(
        &self,
        config: &CaptureConfig,
        events: Sender<EngineEvent>,
        cancel: Arc<AtomicBool>,
    ) -> anyhow::Result<()>;
}

/// Stock backend: enumerates interfaces from sysfs and keeps the session
/// open until cancellation. It carries no BPF compiler, so every filter
/// is rejected; frame dissection is supplied by analyzer backends.
#[derive(Debug, Clone)]
pub struct SysNetBackend {
    sys_class_net: PathBuf,
}

impl SysNetBackend {
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            sys_class_net: root.into(),
        }
    }
}

impl Default for SysNetBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for SysNetBackend {
    fn available_devices(&self) -> io::Result<Vec<String>> {
        let mut devices = Vec::new();
        for entry in std::fs::read_dir(&self.sys_class_net)? {
            devices.push(entry?.file_name().to_string_lossy().into_owned());
        }
        devices.sort();
        Ok(devices)
    }

    fn check_filter(&self, _filter: &str) -> bool {
        false
    }

    fn capture(
        &self,
        config: &CaptureConfig,
        _events: Sender<EngineEvent>,
        cancel: Arc<AtomicBool>,
    ) -> anyhow::Result<()> {
        debug!(
            device = %config.device,
            promiscuous = config.promiscuous,
            "capture session open"
        );

        while !cancel.load(Ordering::SeqCst) {
            thread::sleep(CANCEL_POLL);
        }

        debug!(device = %config.device, "capture session closed");
        Ok(())
    }
}
