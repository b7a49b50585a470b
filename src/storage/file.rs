//! JSON-file key-value store.
//!
//! The whole map is loaded at open and rewritten on every mutation. The
//! file only ever holds a couple of short strings. Writes go to a sibling
//! temp file that is renamed over the target, so readers never see a
//! half-written map. An unreadable map is logged and replaced.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use super::{KeyValueStore, StorageError};

/// Key-value store persisted as a flat JSON object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: DashMap<String, String>,
}

impl FileStore {
    /// Open the store, loading existing entries if the file exists.
    ///
    /// A file that does not hold a JSON string map starts the store empty;
    /// the next write replaces it. I/O errors are returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut inner = DashMap::new();

        if path.exists() {
            match load(&path) {
                Ok(map) => {
                    inner.extend(map);
                    tracing::debug!(path = ?path, entries = inner.len(), "Loaded session storage");
                }
                Err(StorageError::Corrupt(e)) => {
                    tracing::warn!(path = ?path, error = %e, "Session storage unreadable, starting empty");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let tmp = self.tmp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn load(path: &Path) -> Result<HashMap<String, String>, StorageError> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            StorageError::Io(e.into())
        } else {
            StorageError::Corrupt(e)
        }
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.inner.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
