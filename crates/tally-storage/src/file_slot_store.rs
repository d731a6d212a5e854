use std::{
    fs::{self, File},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tally_core::storage::{validate_key, SlotError, SlotStore};
use tempfile::NamedTempFile;
use tracing::instrument;

const SLOT_EXTENSION: &str = "json";

/// File-backed store implementing the shared `SlotStore` contract.
/// The slot `todos` lives at `<root>/todos.json`.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    root: PathBuf,
}

impl FileSlotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, SlotError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{SLOT_EXTENSION}")))
    }
}

#[async_trait]
impl SlotStore for FileSlotStore {
    #[instrument(skip_all, fields(key))]
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        write_atomically(&path, value)
    }

    #[instrument(skip_all, fields(key))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, SlotError> {
        let path = self.path_for(key)?;
        let mut file = File::open(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                SlotError::NotFound {
                    key: key.to_string(),
                }
            } else {
                storage_err(err)
            }
        })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(storage_err)?;
        Ok(buf)
    }

    #[instrument(skip_all, fields(key))]
    async fn delete(&self, key: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

/// Readers see either the previous value or the new one, never a torn write.
fn write_atomically(path: &Path, value: &[u8]) -> Result<(), SlotError> {
    let parent = path.parent().ok_or_else(|| SlotError::Storage {
        reason: "invalid storage path".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

fn storage_err<E: ToString>(err: E) -> SlotError {
    SlotError::Storage {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_plain_bytes_under_key_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSlotStore::new(dir.path().join("nested"));

        store.put("todos", br#"[]"#).await.expect("put");
        let on_disk = fs::read_to_string(dir.path().join("nested").join("todos.json"))
            .expect("read slot file");
        assert_eq!(on_disk, "[]");

        assert_eq!(store.get("todos").await.expect("get"), b"[]");
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSlotStore::new(dir.path());

        store.put("todos", b"first").await.expect("put");
        store.put("todos", b"second").await.expect("overwrite");

        assert_eq!(store.get("todos").await.expect("get"), b"second");
        let entries = fs::read_dir(dir.path()).expect("read_dir").count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn missing_slot_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSlotStore::new(dir.path());

        let err = store.get("todos").await.expect_err("should be missing");
        assert_eq!(
            err,
            SlotError::NotFound {
                key: "todos".into()
            }
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSlotStore::new(dir.path());
        store.put("k", b"v").await.expect("put");
        store.delete("k").await.expect("delete");
        store.delete("k").await.expect("delete again");

        let err = store.get("k").await.expect_err("should be missing");
        assert!(matches!(err, SlotError::NotFound { .. }));
    }

    #[tokio::test]
    async fn refuses_keys_that_escape_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSlotStore::new(dir.path());

        let err = store
            .put("../outside", b"x")
            .await
            .expect_err("key must be rejected");
        assert!(matches!(err, SlotError::InvalidKey { .. }));
    }
}
