//! Hash export. The byte format belongs to the cracking-tool side of the
//! suite; this module only lays the collection out on disk for it.

use bruteshark_core::HashArtifact;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::unique_path;

pub const HASHES_DIR: &str = "Hashes";

/// Writes the hash collection beneath `<dir>/Hashes`: one file per hash
/// type, one value per line. Returns the directory written to.
pub fn export_hashes(dir: &Path, hashes: &HashSet<HashArtifact>) -> anyhow::Result<PathBuf> {
    let hashes_dir = dir.join(HASHES_DIR);
    fs::create_dir_all(&hashes_dir)?;

    let mut by_type: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for hash in hashes {
        by_type
            .entry(hash.hash_type.as_str())
            .or_default()
            .push(hash.value.as_str());
    }

    for (hash_type, mut values) in by_type {
        values.sort_unstable();
        let path = unique_path(&hashes_dir.join(format!("{hash_type}.txt")));
        let mut body = values.join("\n");
        body.push('\n');
        fs::write(&path, body)?;
    }

    Ok(hashes_dir)
}
