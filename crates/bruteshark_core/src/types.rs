use serde::Serialize;
use std::fmt;

/// A credential captured in transit. Two credentials are the same finding
/// only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    pub source: String,
    pub destination: String,
    pub protocol: String,
    pub username: String,
    pub password: String,
    pub context: String,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} credential {} -> {} user: {} password: {}",
            self.protocol, self.source, self.destination, self.username, self.password
        )?;
        if !self.context.is_empty() {
            write!(f, " ({})", self.context)?;
        }
        Ok(())
    }
}

/// An authentication hash extracted from a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashArtifact {
    pub source: String,
    pub destination: String,
    pub protocol: String,
    pub value: String,
    pub hash_type: String,
}

impl fmt::Display for HashArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hash {} -> {} ({}): {}",
            self.hash_type, self.source, self.destination, self.protocol, self.value
        )
    }
}

/// A file reassembled from a stream, payload bytes included. The payload
/// participates in equality: identical endpoints carrying different
/// content are distinct findings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractedFile {
    pub source: String,
    pub destination: String,
    pub extension: String,
    pub data: Vec<u8>,
}

impl ExtractedFile {
    /// File name used when the artifact is written out.
    pub fn export_name(&self) -> String {
        format!("{} - {}.{}", self.source, self.destination, self.extension)
    }
}

impl fmt::Display for ExtractedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file {} -> {} ({} bytes)",
            self.extension,
            self.source,
            self.destination,
            self.data.len()
        )
    }
}

/// One observed connection between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub source: String,
    pub destination: String,
    pub protocol: String,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.protocol, self.source, self.destination)
    }
}

/// A name-to-address mapping observed in DNS traffic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsMapping {
    pub query: String,
    pub answer: String,
    pub record_type: String,
}

impl fmt::Display for DnsMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) -> {}", self.query, self.record_type, self.answer)
    }
}

/// One discrete unit of extracted forensic information, as emitted by the
/// analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Finding {
    Credential(Credential),
    Hash(HashArtifact),
    File(ExtractedFile),
    Connection(Connection),
    Dns(DnsMapping),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential(c) => c.fmt(f),
            Self::Hash(h) => h.fmt(f),
            Self::File(x) => x.fmt(f),
            Self::Connection(c) => c.fmt(f),
            Self::Dns(d) => d.fmt(f),
        }
    }
}

/// Per-input-file processing transition. Rendering only; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Started,
    Finished,
    Failed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}
