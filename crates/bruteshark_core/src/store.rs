use dashmap::DashSet;
use std::collections::HashSet;

use crate::types::{Connection, Credential, DnsMapping, ExtractedFile, Finding, HashArtifact};

/// In-memory holding area for every finding of a run. One deduplicating
/// set per finding kind; inserts from any number of analysis workers are
/// safe and collapse concurrent identical findings to a single instance.
/// The store only ever grows; it is read once, at export time.
#[derive(Debug, Default)]
pub struct ResultStore {
    credentials: DashSet<Credential>,
    hashes: DashSet<HashArtifact>,
    files: DashSet<ExtractedFile>,
    connections: DashSet<Connection>,
    dns_mappings: DashSet<DnsMapping>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a finding into the set matching its kind. Returns true iff
    /// the finding was not already present under that kind's equality
    /// rule. When several workers insert the same finding at once,
    /// exactly one caller sees true.
    pub fn insert(&self, finding: Finding) -> bool {
        match finding {
            Finding::Credential(c) => self.credentials.insert(c),
            Finding::Hash(h) => self.hashes.insert(h),
            Finding::File(f) => self.files.insert(f),
            Finding::Connection(c) => self.connections.insert(c),
            Finding::Dns(d) => self.dns_mappings.insert(d),
        }
    }

    /// Read-only copy of the accumulated results for the export pipeline.
    pub fn snapshot(&self) -> ResultSet {
        ResultSet {
            credentials: self.credentials.iter().map(|r| r.key().clone()).collect(),
            hashes: self.hashes.iter().map(|r| r.key().clone()).collect(),
            files: self.files.iter().map(|r| r.key().clone()).collect(),
            connections: self.connections.iter().map(|r| r.key().clone()).collect(),
            dns_mappings: self.dns_mappings.iter().map(|r| r.key().clone()).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.credentials.len()
            + self.hashes.len()
            + self.files.len()
            + self.connections.len()
            + self.dns_mappings.len()
    }
}

/// Point-in-time view of a [`ResultStore`].
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub credentials: HashSet<Credential>,
    pub hashes: HashSet<HashArtifact>,
    pub files: HashSet<ExtractedFile>,
    pub connections: HashSet<Connection>,
    pub dns_mappings: HashSet<DnsMapping>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
            && self.hashes.is_empty()
            && self.files.is_empty()
            && self.connections.is_empty()
            && self.dns_mappings.is_empty()
    }
}
