pub mod error;
pub mod modules;
pub mod store;
pub mod types;

pub use error::ConfigError;
pub use modules::{ModuleKind, ModuleSet, parse_modules};
pub use store::{ResultSet, ResultStore};
pub use types::{
    Connection, Credential, DnsMapping, ExtractedFile, FileStatus, Finding, HashArtifact,
};
