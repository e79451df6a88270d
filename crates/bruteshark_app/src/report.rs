use console::style;

/// Severity of a user-facing report line. Rendering is decided by the
/// sink, not by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// Destination for user-facing output. All result and progress lines go
/// through a sink so presentation stays out of the pipeline itself.
pub trait ReportSink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

/// Renders reports on the terminal: success lines in green, errors in red
/// on stderr, everything else plain.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl ReportSink for ConsoleSink {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Info => println!("{message}"),
            Level::Success => println!("{}", style(message).green()),
            Level::Error => eprintln!("{}", style(message).red()),
        }
    }
}
