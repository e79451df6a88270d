use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors. All of these are fatal before processing starts,
/// except that missing individual input files are reported and skipped
/// during batch resolution instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no analysis modules selected")]
    NoModulesSelected,

    #[error("unknown analysis module: {0}")]
    UnknownModule(String),

    #[error("input files and an input directory cannot be combined; use only one of -i and -d")]
    InputConflict,

    #[error("a capture device cannot be combined with file or directory input")]
    CaptureConflict,

    #[error("no input selected; provide input files, an input directory or a capture device")]
    MissingInput,

    #[error("{} is not a valid directory path", .0.display())]
    NotADirectory(PathBuf),

    #[error("no such capture device: {0}")]
    DeviceNotFound(String),

    #[error("invalid capture filter: {0} (filters must use BPF syntax)")]
    InvalidCaptureFilter(String),
}
