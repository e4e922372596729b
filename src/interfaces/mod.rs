//! Interface discovery
//!
//! Two interchangeable backends produce candidate interface names:
//!
//! - `directory`: scan the WireGuard config directory for `*.conf` files
//! - `persisted`: read the list captured earlier by `capture`, for setups
//!   where the directory is only readable by root
//!
//! Discovery never fails a refresh. An unreachable source yields no names.

pub mod capture;
pub mod directory;
pub mod persisted;

pub use directory::DirectorySource;
pub use persisted::{InterfaceStore, PersistedSource};

use crate::config::{Config, SourceStrategy};
use crate::error::ReconcileError;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Enumerates candidate interface names
pub trait InterfaceSource: Send + Sync {
    fn try_list(&self) -> Result<Vec<String>, ReconcileError>;

    /// Deduplicated names in sorted order. Errors are logged and yield
    /// an empty list.
    fn list(&self) -> Vec<String> {
        match self.try_list() {
            Ok(names) => normalize(names),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }
}

/// Drop empty names, dedupe, and sort for a stable menu order
pub fn normalize<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Directory scan first, captured list when the directory is unreadable
pub struct AutoSource {
    directory: DirectorySource,
    persisted: PersistedSource,
}

impl AutoSource {
    pub fn new(directory: DirectorySource, persisted: PersistedSource) -> Self {
        Self {
            directory,
            persisted,
        }
    }
}

impl InterfaceSource for AutoSource {
    fn try_list(&self) -> Result<Vec<String>, ReconcileError> {
        match self.directory.try_list() {
            Ok(names) => Ok(names),
            Err(e) => {
                debug!("{}, falling back to persisted list", e);
                self.persisted.try_list()
            }
        }
    }
}

/// Build the interface source selected by the configuration
pub fn source_from_config(config: &Config) -> Box<dyn InterfaceSource> {
    let directory = DirectorySource::new(
        config.wireguard.config_dir.clone(),
        config.wireguard.config_suffix.clone(),
    );
    let persisted = PersistedSource::new(InterfaceStore::new(config.store_path()));

    match config.source.strategy {
        SourceStrategy::Directory => Box::new(directory),
        SourceStrategy::Persisted => Box::new(persisted),
        SourceStrategy::Auto => Box::new(AutoSource::new(directory, persisted)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Failing;

    impl InterfaceSource for Failing {
        fn try_list(&self) -> Result<Vec<String>, ReconcileError> {
            Err(ReconcileError::DiscoveryUnavailable("gone".to_string()))
        }
    }

    #[test]
    fn test_normalize_dedupes_and_sorts() {
        let names = vec![
            "office".to_string(),
            "home".to_string(),
            " office ".to_string(),
            String::new(),
        ];
        assert_eq!(normalize(names), vec!["home", "office"]);
    }

    #[test]
    fn test_failing_source_lists_nothing() {
        assert!(Failing.list().is_empty());
    }

    #[test]
    fn test_auto_prefers_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("wg0.conf"), "").unwrap();
        let store = InterfaceStore::new(temp_dir.path().join("settings.json"));
        store.save(&["cached".to_string()]).unwrap();

        let source = AutoSource::new(
            DirectorySource::new(temp_dir.path().to_path_buf(), ".conf"),
            PersistedSource::new(store),
        );
        assert_eq!(source.list(), vec!["wg0"]);
    }

    #[test]
    fn test_auto_falls_back_to_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let store = InterfaceStore::new(temp_dir.path().join("settings.json"));
        store.save(&["cached".to_string()]).unwrap();

        let source = AutoSource::new(
            DirectorySource::new(temp_dir.path().join("missing"), ".conf"),
            PersistedSource::new(store),
        );
        assert_eq!(source.list(), vec!["cached"]);
    }

    #[test]
    fn test_source_from_config_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("home.conf"), "").unwrap();

        let mut config = Config::default();
        config.wireguard.config_dir = temp_dir.path().to_path_buf();
        config.source.strategy = SourceStrategy::Directory;
        config.source.store_path = Some(temp_dir.path().join("settings.json"));

        assert_eq!(source_from_config(&config).list(), vec!["home"]);
    }
}
