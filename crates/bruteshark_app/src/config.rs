use bruteshark_core::{ConfigError, ModuleSet, parse_modules};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::{Level, ReportSink};

#[derive(Debug, Parser)]
#[command(name = "bruteshark")]
#[command(version)]
#[command(about = "Network forensics result aggregation and export", long_about = None)]
pub struct Args {
    /// Analysis modules to enable: credentials, dns, file-extraction, network-map
    #[arg(short = 'm', long = "module", value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Capture file to process (repeatable)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input_files: Vec<PathBuf>,

    /// Directory whose top-level capture files are processed
    #[arg(short = 'd', long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the accumulated results are exported to
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Network device to capture from live
    #[arg(short = 'l', long = "live-device", value_name = "DEVICE")]
    pub capture_device: Option<String>,

    /// Enable promiscuous mode on the capture device
    #[arg(short = 'p', long = "promiscuous")]
    pub promiscuous: bool,

    /// Capture filter in BPF syntax, validated by the capture backend
    #[arg(short = 'f', long = "filter", value_name = "BPF")]
    pub capture_filter: Option<String>,
}

/// Live-capture settings, fixed for the run.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub device: String,
    pub promiscuous: bool,
    pub filter: Option<String>,
}

/// Exactly one input source per run.
#[derive(Debug, Clone)]
pub enum InputSource {
    Files(Vec<PathBuf>),
    Directory(PathBuf),
    Capture(CaptureConfig),
}

/// Validated run configuration. Immutable once built; every later phase
/// only reads it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub modules: ModuleSet,
    pub input: InputSource,
    pub output_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Enforces the configuration invariants: a non-empty, known module
    /// selection, and exactly one of file list, input directory, or
    /// capture device. Any violation aborts before processing starts.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let modules = parse_modules(&args.modules)?;

        let has_files = !args.input_files.is_empty();
        let has_dir = args.input_dir.is_some();

        if has_files && has_dir {
            return Err(ConfigError::InputConflict);
        }
        if args.capture_device.is_some() && (has_files || has_dir) {
            return Err(ConfigError::CaptureConflict);
        }

        let input = if let Some(device) = args.capture_device {
            InputSource::Capture(CaptureConfig {
                device,
                promiscuous: args.promiscuous,
                filter: args.capture_filter,
            })
        } else if let Some(dir) = args.input_dir {
            InputSource::Directory(dir)
        } else if has_files {
            InputSource::Files(args.input_files)
        } else {
            return Err(ConfigError::MissingInput);
        };

        Ok(Self {
            modules,
            input,
            output_dir: args.output_dir,
        })
    }
}

/// Keeps the paths that exist; a missing path is reported and skipped,
/// never fatal to the rest of the batch.
pub fn resolve_file_list(paths: &[PathBuf], sink: &dyn ReportSink) -> Vec<PathBuf> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else {
            sink.emit(
                Level::Error,
                &format!("File does not exist, skipping: {}", path.display()),
            );
        }
    }
    files
}

/// Collects the top-level regular files of `dir`. Subdirectories are not
/// descended.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|_| ConfigError::NotADirectory(dir.to_path_buf()))?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
