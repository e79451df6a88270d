//! Whole-run scenarios: batch and live runs wired through the controller,
//! with fake analyzers and capture backends standing in for the engine.

use anyhow::Result;
use crossbeam_channel::Sender;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use bruteshark::capture::CaptureBackend;
use bruteshark::config::{Args, CaptureConfig, RunConfig};
use bruteshark::controller;
use bruteshark::engine::{BatchEngine, EngineEvent, FileAnalyzer, FindingSink};
use bruteshark::report::{Level, ReportSink};
use bruteshark_core::{Connection, Credential, DnsMapping, Finding, ModuleKind};

#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingSink {
    fn found_lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.starts_with("Found: "))
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(_, m)| m.contains(needle))
    }
}

impl ReportSink for RecordingSink {
    fn emit(&self, level: Level, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

struct FakeBackend {
    devices: Vec<String>,
    accept_filter: bool,
    emit_dns: usize,
}

impl CaptureBackend for FakeBackend {
    fn available_devices(&self) -> io::Result<Vec<String>> {
        Ok(self.devices.clone())
    }

    fn check_filter(&self, _filter: &str) -> bool {
        self.accept_filter
    }

    fn capture(
        &self,
        _config: &CaptureConfig,
        events: Sender<EngineEvent>,
        cancel: Arc<AtomicBool>,
    ) -> Result<()> {
        for n in 0..self.emit_dns {
            let _ = events.send(EngineEvent::Finding(Finding::Dns(dns(n as u32))));
        }
        while !cancel.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }
}

/// Emits the same credential and the same connection for every file it
/// sees, mimicking identical findings surfacing from parallel workers.
struct RepeatedFindings;

impl FileAnalyzer for RepeatedFindings {
    fn module(&self) -> ModuleKind {
        ModuleKind::Credentials
    }

    fn analyze(&self, _path: &Path, _data: &[u8], sink: &FindingSink<'_>) -> Result<()> {
        sink.push(Finding::Credential(Credential {
            source: "10.0.0.5:1080".into(),
            destination: "10.0.0.1:21".into(),
            protocol: "FTP".into(),
            username: "alice".into(),
            password: "wonderland".into(),
            context: String::new(),
        }));
        sink.push(Finding::Connection(Connection {
            source: "10.0.0.5:1080".into(),
            destination: "10.0.0.1:21".into(),
            protocol: "FTP".into(),
        }));
        Ok(())
    }
}

/// Emits three DNS mappings, then holds its file open until cancellation.
struct DnsThenBlock {
    cancel: Arc<AtomicBool>,
}

impl FileAnalyzer for DnsThenBlock {
    fn module(&self) -> ModuleKind {
        ModuleKind::Dns
    }

    fn analyze(&self, _path: &Path, _data: &[u8], sink: &FindingSink<'_>) -> Result<()> {
        for n in 0..3 {
            sink.push(Finding::Dns(dns(n)));
        }
        while !self.cancel.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }
}

fn dns(n: u32) -> DnsMapping {
    DnsMapping {
        query: format!("host{n}.example.com"),
        answer: format!("10.9.0.{n}"),
        record_type: "A".into(),
    }
}

fn write_capture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"capture bytes").unwrap();
    path
}

fn batch_config(modules: &[&str], files: Vec<PathBuf>, output: &Path) -> RunConfig {
    RunConfig::from_args(Args {
        modules: modules.iter().map(|m| m.to_string()).collect(),
        input_files: files,
        input_dir: None,
        output_dir: Some(output.to_path_buf()),
        capture_device: None,
        promiscuous: false,
        capture_filter: None,
    })
    .unwrap()
}

fn live_config(device: &str, filter: Option<&str>, output: Option<&Path>) -> RunConfig {
    RunConfig::from_args(Args {
        modules: vec!["dns".into()],
        input_files: Vec::new(),
        input_dir: None,
        output_dir: output.map(Path::to_path_buf),
        capture_device: Some(device.to_string()),
        promiscuous: false,
        capture_filter: filter.map(str::to_string),
    })
    .unwrap()
}

fn no_capture_backend() -> FakeBackend {
    FakeBackend {
        devices: Vec::new(),
        accept_filter: false,
        emit_dns: 0,
    }
}

#[test]
fn test_batch_run_deduplicates_and_exports() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let files = vec![
        write_capture(input.path(), "one.pcap"),
        write_capture(input.path(), "two.pcap"),
    ];

    let config = batch_config(&["credentials", "network-map"], files, output.path());
    let engine = BatchEngine::new(vec![Box::new(RepeatedFindings)]).with_workers(2);
    let sink = RecordingSink::default();
    let cancel = Arc::new(AtomicBool::new(false));

    controller::run(&config, engine, &no_capture_backend(), &sink, cancel).unwrap();

    // Two workers reported the same credential; it is logged once.
    assert_eq!(sink.found_lines().len(), 1);
    assert!(sink.found_lines()[0].contains("alice"));
    assert!(sink.contains("[+] BruteShark finished processing"));

    // The network map holds exactly one deduplicated connection, and the
    // never-logged connections produced no Found lines of their own.
    let map = output.path().join("BruteShark Network Map.json");
    let parsed: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0]["protocol"], "FTP");
}

#[test]
fn test_second_export_avoids_the_first_ones_files() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    for _ in 0..2 {
        let files = vec![write_capture(input.path(), "one.pcap")];
        let config = batch_config(&["credentials", "network-map"], files, output.path());
        let engine = BatchEngine::new(vec![Box::new(RepeatedFindings)]).with_workers(1);
        let sink = RecordingSink::default();
        let cancel = Arc::new(AtomicBool::new(false));
        controller::run(&config, engine, &no_capture_backend(), &sink, cancel).unwrap();
    }

    assert!(output.path().join("BruteShark Network Map.json").is_file());
    assert!(output.path().join("BruteShark Network Map 1.json").is_file());
}

#[test]
fn test_interrupted_batch_still_exports_inserted_findings() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let files = vec![write_capture(input.path(), "one.pcap")];

    let config = batch_config(&["dns"], files, output.path());
    let cancel = Arc::new(AtomicBool::new(false));
    let engine = BatchEngine::new(vec![Box::new(DnsThenBlock {
        cancel: Arc::clone(&cancel),
    })])
    .with_workers(1);
    let sink = Arc::new(RecordingSink::default());

    let watcher = {
        let sink = Arc::clone(&sink);
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(10);
            while sink.found_lines().len() < 3 {
                assert!(Instant::now() < deadline, "findings never surfaced");
                thread::sleep(Duration::from_millis(10));
            }
            cancel.store(true, Ordering::SeqCst);
        })
    };

    controller::run(&config, engine, &no_capture_backend(), &*sink, Arc::clone(&cancel))
        .unwrap();
    watcher.join().unwrap();

    let body =
        fs::read_to_string(output.path().join("BruteShark DNS Mappings.json")).unwrap();
    assert_eq!(body.lines().count(), 3);
}

#[test]
fn test_live_run_with_unknown_device_is_fatal_and_exports_nothing() {
    let output = TempDir::new().unwrap();
    let config = live_config("wlan9", None, Some(output.path()));
    let backend = FakeBackend {
        devices: vec!["eth0".into()],
        accept_filter: true,
        emit_dns: 0,
    };
    let sink = RecordingSink::default();
    let cancel = Arc::new(AtomicBool::new(false));

    let err = controller::run(&config, BatchEngine::new(Vec::new()), &backend, &sink, cancel)
        .unwrap_err();
    assert!(err.to_string().contains("no such capture device"));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_live_run_with_rejected_filter_is_fatal() {
    let config = live_config("eth0", Some("tcp port 80"), None);
    let backend = FakeBackend {
        devices: vec!["eth0".into()],
        accept_filter: false,
        emit_dns: 0,
    };
    let sink = RecordingSink::default();
    let cancel = Arc::new(AtomicBool::new(false));

    let err = controller::run(&config, BatchEngine::new(Vec::new()), &backend, &sink, cancel)
        .unwrap_err();
    assert!(err.to_string().contains("invalid capture filter"));
}

#[test]
fn test_live_run_exports_on_interruption() {
    let output = TempDir::new().unwrap();
    let config = live_config("eth0", None, Some(output.path()));
    let backend = FakeBackend {
        devices: vec!["eth0".into()],
        accept_filter: true,
        emit_dns: 2,
    };
    let sink = Arc::new(RecordingSink::default());
    let cancel = Arc::new(AtomicBool::new(false));

    let watcher = {
        let sink = Arc::clone(&sink);
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(10);
            while sink.found_lines().len() < 2 {
                assert!(Instant::now() < deadline, "findings never surfaced");
                thread::sleep(Duration::from_millis(10));
            }
            cancel.store(true, Ordering::SeqCst);
        })
    };

    controller::run(
        &config,
        BatchEngine::new(Vec::new()),
        &backend,
        &*sink,
        Arc::clone(&cancel),
    )
    .unwrap();
    watcher.join().unwrap();

    assert!(sink.contains("[+] Started analyzing packets from eth0"));

    let body =
        fs::read_to_string(output.path().join("BruteShark DNS Mappings.json")).unwrap();
    assert_eq!(body.lines().count(), 2);
}
