//! Storage boundary for raw font bytes.

use std::fs;
use std::path::PathBuf;

use crate::error::FontError;

/// Supplies raw font-file bytes for an identifier.
pub trait FontStore {
    fn load(&self, identifier: &str) -> Result<Vec<u8>, FontError>;
}

/// Loads fonts from files under a root directory.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FontStore for DirectoryStore {
    fn load(&self, identifier: &str) -> Result<Vec<u8>, FontError> {
        let path = self.root.join(identifier);
        fs::read(&path).map_err(|source| FontError::FontNotFound {
            identifier: identifier.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_font_not_found() {
        let store = DirectoryStore::new("/nonexistent-font-dir");
        let err = store.load("missing.ttf").unwrap_err();
        assert!(matches!(
            err,
            FontError::FontNotFound { ref identifier, .. } if identifier == "missing.ttf"
        ));
    }

    #[test]
    fn load_returns_the_file_bytes() {
        let dir = std::env::temp_dir();
        let name = format!("lumo-store-test-{}.bin", std::process::id());
        fs::write(dir.join(&name), [1u8, 2, 3]).unwrap();

        let store = DirectoryStore::new(&dir);
        let bytes = store.load(&name).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let _ = fs::remove_file(dir.join(&name));
    }
}
