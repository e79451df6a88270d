use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// The fixed set of analysis modules a run can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    Credentials,
    Dns,
    FileExtraction,
    NetworkMap,
}

pub type ModuleSet = BTreeSet<ModuleKind>;

impl ModuleKind {
    pub const ALL: [Self; 4] = [
        Self::Credentials,
        Self::Dns,
        Self::FileExtraction,
        Self::NetworkMap,
    ];

    /// Name accepted on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Dns => "dns",
            Self::FileExtraction => "file-extraction",
            Self::NetworkMap => "network-map",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| ConfigError::UnknownModule(s.to_string()))
    }
}

/// Maps user-supplied module names to the enumerated set. The mapping is
/// total: an empty selection or any unknown name is a configuration
/// error, never a silent drop.
pub fn parse_modules(names: &[String]) -> Result<ModuleSet, ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::NoModulesSelected);
    }
    names.iter().map(|name| name.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_module_round_trips_through_its_name() {
        for module in ModuleKind::ALL {
            assert_eq!(module.name().parse::<ModuleKind>().unwrap(), module);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "Network-Map".parse::<ModuleKind>().unwrap(),
            ModuleKind::NetworkMap
        );
    }

    #[test]
    fn test_unknown_name_is_a_config_error() {
        let err = "ftp-bruteforce".parse::<ModuleKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModule(name) if name == "ftp-bruteforce"));
    }

    #[test]
    fn test_empty_selection_is_a_config_error() {
        assert!(matches!(
            parse_modules(&[]),
            Err(ConfigError::NoModulesSelected)
        ));
    }

    #[test]
    fn test_parse_modules_deduplicates() {
        let set = parse_modules(&["dns".into(), "dns".into(), "credentials".into()]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&ModuleKind::Dns));
        assert!(set.contains(&ModuleKind::Credentials));
    }
}
