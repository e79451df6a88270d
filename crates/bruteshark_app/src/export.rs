use bruteshark_core::{Connection, DnsMapping, ExtractedFile, ResultSet};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::hashes;
use crate::report::{Level, ReportSink};

pub const NETWORK_MAP_FILE: &str = "BruteShark Network Map.json";
pub const DNS_MAPPINGS_FILE: &str = "BruteShark DNS Mappings.json";
pub const FILES_DIR: &str = "Files";

/// Returns `path` when nothing exists there; otherwise the first unused
/// variant with `" <counter>"` inserted before the extension, counting
/// from 1. Exports of earlier runs are never overwritten.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    for counter in 1u32.. {
        let name = match &extension {
            Some(ext) => format!("{stem} {counter}.{ext}"),
            None => format!("{stem} {counter}"),
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("counter space exhausted")
}

/// Writes each non-empty collection beneath `output_dir`. Without an
/// output directory the accumulated results only ever lived in memory and
/// are discarded. Collections are attempted independently: a failure is
/// reported and the remaining collections are still written.
pub fn export_all(results: &ResultSet, output_dir: Option<&Path>, sink: &dyn ReportSink) {
    let Some(dir) = output_dir else { return };

    if !results.connections.is_empty() {
        match export_network_map(dir, &results.connections) {
            Ok(path) => sink.emit(
                Level::Info,
                &format!(
                    "Successfully exported network map to json file: {}",
                    path.display()
                ),
            ),
            Err(err) => sink.emit(Level::Error, &format!("Failed to export network map: {err:#}")),
        }
    }

    if !results.hashes.is_empty() {
        if let Err(err) = hashes::export_hashes(dir, &results.hashes) {
            sink.emit(Level::Error, &format!("Failed to export hashes: {err:#}"));
        }
    }

    if !results.files.is_empty() {
        match export_extracted_files(dir, &results.files, sink) {
            Ok(files_dir) => sink.emit(
                Level::Info,
                &format!(
                    "Successfully exported extracted files to: {}",
                    files_dir.display()
                ),
            ),
            Err(err) => sink.emit(
                Level::Error,
                &format!("Failed to export extracted files: {err:#}"),
            ),
        }
    }

    if !results.dns_mappings.is_empty() {
        match export_dns_mappings(dir, &results.dns_mappings) {
            Ok(path) => sink.emit(
                Level::Info,
                &format!(
                    "Successfully exported DNS mappings to file: {}",
                    path.display()
                ),
            ),
            Err(err) => sink.emit(
                Level::Error,
                &format!("Failed to export DNS mappings: {err:#}"),
            ),
        }
    }
}

/// Pretty-printed serialization of the whole connection set; element
/// order carries no meaning.
pub fn export_network_map(dir: &Path, connections: &HashSet<Connection>) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = unique_path(&dir.join(NETWORK_MAP_FILE));
    let entries: Vec<&Connection> = connections.iter().collect();
    fs::write(&path, serde_json::to_string_pretty(&entries)?)?;
    Ok(path)
}

/// One file per artifact under `Files/`, raw payload bytes verbatim. A
/// single artifact failing to write is reported and the rest continue.
pub fn export_extracted_files(
    dir: &Path,
    files: &HashSet<ExtractedFile>,
    sink: &dyn ReportSink,
) -> anyhow::Result<PathBuf> {
    let files_dir = dir.join(FILES_DIR);
    fs::create_dir_all(&files_dir)?;

    for artifact in files {
        let path = unique_path(&files_dir.join(artifact.export_name()));
        if let Err(err) = fs::write(&path, &artifact.data) {
            sink.emit(
                Level::Error,
                &format!("Failed to write {}: {err}", path.display()),
            );
        }
    }

    Ok(files_dir)
}

/// One rendered mapping per line. The file keeps its `.json` name even
/// though the content is line-delimited text.
pub fn export_dns_mappings(dir: &Path, mappings: &HashSet<DnsMapping>) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = unique_path(&dir.join(DNS_MAPPINGS_FILE));

    let mut body = String::new();
    for mapping in mappings {
        body.push_str(&mapping.to_string());
        body.push('\n');
    }
    fs::write(&path, body)?;
    Ok(path)
}
