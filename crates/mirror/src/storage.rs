//! Where the mirror document lives.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Key under which the whole document is stored.
pub const STORAGE_KEY: &str = "whopaid_events";

/// A single-slot text store.
pub trait Storage {
    /// Return the stored document, `None` if nothing was saved yet.
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&mut self, document: &str) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

/// Document kept in `<dir>/whopaid_events.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&mut self, document: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, document)
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// In-process storage, lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    document: Option<String>,
}

impl MemoryStorage {
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &str) -> io::Result<()> {
        self.document = Some(document.to_string());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.document = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.load().unwrap(), None);
        storage.save("[]").unwrap();
        assert!(storage.path().ends_with("nested/whopaid_events.json"));
        assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        // Clearing an empty store is fine.
        storage.clear().unwrap();
    }

    #[test]
    fn memory_storage_clear() {
        let mut storage = MemoryStorage::with_document("[]");
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
