use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::KeyValueStore;

/// A JSON object on disk, one string value per key.
///
/// Every `set` rewrites the whole file through a temporary sibling that is
/// renamed into place, so readers only ever see a complete snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomic(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = encode(&self.path, entries)?;

        let tmp_path = self.tmp_path();
        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp_path, &self.path).map_err(io_err)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        tracing::debug!(
            path = %self.path.display(),
            key,
            bytes = value.len(),
            "writing store snapshot"
        );
        self.write_atomic(&entries)
    }
}

fn encode(path: &Path, entries: &BTreeMap<String, String>) -> Result<String, StoreError> {
    serde_json::to_string_pretty(entries).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("markdown").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_from_fresh_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut store = FileStore::new(&path);
        store.set("markdown", "# Hi\n").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("markdown").unwrap().as_deref(), Some("# Hi\n"));
    }

    #[test]
    fn test_set_preserves_other_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("store.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::new(&path);
        store.set("markdown", "text").unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("markdown"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_write_into_directory_path_fails() {
        let dir = tempdir().unwrap();
        // A directory can be neither read as a snapshot nor replaced by one.
        let mut store = FileStore::new(dir.path());
        assert!(store.set("markdown", "text").is_err());
    }

    #[test]
    fn test_failed_write_is_not_reported_as_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::create_dir(dir.path().join("store.json.tmp")).unwrap();
        let mut store = FileStore::new(&path);
        assert!(matches!(
            store.set("markdown", "text"),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_encode_failure_names_encoding() {
        let source = serde_json::from_str::<String>("{").unwrap_err();
        let err = StoreError::Serialize {
            path: PathBuf::from("store.json"),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("failed to encode store store.json"));
        assert!(!message.contains("corrupt"));
    }

    #[test]
    fn test_encode_writes_json_object() {
        let mut entries = BTreeMap::new();
        entries.insert("markdown".to_string(), "# Hi".to_string());
        let json = encode(Path::new("store.json"), &entries).unwrap();
        assert_eq!(
            serde_json::from_str::<BTreeMap<String, String>>(&json).unwrap(),
            entries
        );
    }
}
