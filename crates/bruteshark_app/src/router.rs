use bruteshark_core::{FileStatus, Finding, ResultStore};
use std::path::Path;

use crate::report::{Level, ReportSink};

/// Routes one finding into the store. A `Found:` line is emitted only for
/// a first occurrence. Connections are the exception: they are stored but
/// never logged, at any novelty — their volume would drown the output.
pub fn route_finding(store: &ResultStore, finding: Finding, sink: &dyn ReportSink) {
    let rendered = match &finding {
        Finding::Connection(_) => None,
        other => Some(other.to_string()),
    };

    if store.insert(finding) {
        if let Some(rendered) = rendered {
            sink.emit(Level::Info, &format!("Found: {rendered}"));
        }
    }
}

/// Emits one line per file-status transition. Failures render at error
/// level; they never alter control flow.
pub fn report_file_status(sink: &dyn ReportSink, path: &Path, status: FileStatus) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let level = match status {
        FileStatus::Started | FileStatus::Finished => Level::Success,
        FileStatus::Failed => Level::Error,
    };

    sink.emit(level, &format!("File: {name} processing {status}"));
}
