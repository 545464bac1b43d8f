use crate::core::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Files under `base_path`. Append handles are opened once and reused for
/// the rest of the run.
#[derive(Debug, Default)]
pub struct LocalStorage {
    base_path: PathBuf,
    appenders: Mutex<HashMap<PathBuf, File>>,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            appenders: Mutex::new(HashMap::new()),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    fn open_append(full_path: &Path) -> std::io::Result<File> {
        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(full_path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.full_path(path)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        let mut appenders = self
            .appenders
            .lock()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "storage lock poisoned"))?;

        let file = match appenders.entry(full_path) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let file = Self::open_append(entry.key())?;
                tracing::debug!("Opened {} for appending", entry.key().display());
                entry.insert(file)
            }
        };

        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        assert!(storage.read_file("missing.csv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("master.csv"), "Name\nOld\n").unwrap();

        let storage = LocalStorage::new(temp_dir.path());
        storage.append_file("master.csv", b"New\n").await.unwrap();
        storage.append_file("master.csv", b"Newer\n").await.unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("master.csv")).unwrap();
        assert_eq!(content, "Name\nOld\nNew\nNewer\n");
    }

    #[tokio::test]
    async fn test_append_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.append_file("leads/master.csv", b"Name\n").await.unwrap();

        let data = storage.read_file("leads/master.csv").await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"Name\n"[..]));
    }
}
