//! Credential enumeration

use crate::CourierError;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered, one-shot iterator over service-account key files
///
/// Key files are discovered once at startup, sorted by path so the order is
/// stable for the process lifetime, and consumed front to back. Once the
/// cursor passes the last key, the source stays exhausted; there is no
/// wraparound. Discovery only lists the directory; no key is parsed and no
/// network call happens until a session is actually built from it.
pub struct CredentialSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl CredentialSource {
    /// Discovers `.json` key files in `dir`, skipping everything else
    pub fn discover(dir: &Path) -> Result<Self, CourierError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        paths.sort();

        tracing::debug!(
            "Discovered {} credential files in {}",
            paths.len(),
            dir.display()
        );
        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    /// Builds a source from an explicit list of key paths
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into_iter(),
        }
    }

    /// Advances the cursor and returns the next key path, or `None` once the
    /// pool is exhausted
    pub fn next_key_path(&mut self) -> Option<PathBuf> {
        self.paths.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"{}").unwrap();
    }

    #[test]
    fn test_discover_skips_non_json_entries() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.json");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "a.json");
        touch(dir.path(), "README");

        let mut source = CredentialSource::discover(dir.path()).unwrap();

        // Sorted by path, json only
        assert_eq!(
            source.next_key_path(),
            Some(dir.path().join("a.json"))
        );
        assert_eq!(
            source.next_key_path(),
            Some(dir.path().join("b.json"))
        );
        assert_eq!(source.next_key_path(), None);
    }

    #[test]
    fn test_exhausted_source_stays_exhausted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "only.json");

        let mut source = CredentialSource::discover(dir.path()).unwrap();
        assert!(source.next_key_path().is_some());
        assert_eq!(source.next_key_path(), None);
        assert_eq!(source.next_key_path(), None);
    }

    #[test]
    fn test_empty_directory_is_immediately_exhausted() {
        let dir = TempDir::new().unwrap();
        let mut source = CredentialSource::discover(dir.path()).unwrap();
        assert_eq!(source.next_key_path(), None);
    }

    #[test]
    fn test_missing_directory_errors() {
        let result = CredentialSource::discover(Path::new("/nonexistent/api_keys"));
        assert!(matches!(result, Err(CourierError::Io(_))));
    }
}
