//! Interface names from the WireGuard config directory

use super::InterfaceSource;
use crate::error::ReconcileError;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct DirectorySource {
    dir: PathBuf,
    suffix: String,
}

impl DirectorySource {
    pub fn new(dir: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            dir,
            suffix: suffix.into(),
        }
    }
}

impl InterfaceSource for DirectorySource {
    fn try_list(&self) -> Result<Vec<String>, ReconcileError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            ReconcileError::DiscoveryUnavailable(format!("{}: {}", self.dir.display(), e))
        })?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = strip_suffix(&file_name.to_string_lossy(), &self.suffix) {
                names.push(name.to_string());
            }
        }

        debug!("Found {} interface(s) in {}", names.len(), self.dir.display());
        Ok(names)
    }
}

/// Interface name for a config file name, if it carries `suffix`
pub fn strip_suffix<'a>(file_name: &'a str, suffix: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(suffix)
        .filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("wg0.conf", ".conf"), Some("wg0"));
        assert_eq!(strip_suffix("notes.txt", ".conf"), None);
        assert_eq!(strip_suffix(".conf", ".conf"), None);
    }

    #[test]
    fn test_lists_conf_files_only() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("home.conf"), "[Interface]\n").unwrap();
        fs::write(temp_dir.path().join("office.conf"), "[Interface]\n").unwrap();
        fs::write(temp_dir.path().join("privatekey"), "secret").unwrap();
        fs::create_dir(temp_dir.path().join("old.conf")).unwrap();

        let source = DirectorySource::new(temp_dir.path().to_path_buf(), ".conf");
        assert_eq!(source.list(), vec!["home", "office"]);
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = DirectorySource::new(temp_dir.path().join("nope"), ".conf");

        assert!(matches!(
            source.try_list(),
            Err(ReconcileError::DiscoveryUnavailable(_))
        ));
        assert!(source.list().is_empty());
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = DirectorySource::new(temp_dir.path().to_path_buf(), ".conf");
        assert_eq!(source.try_list().unwrap(), Vec::<String>::new());
    }
}
