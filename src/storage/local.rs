use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{ObjectStore, StorageError, check_key};

/// Keeps objects as plain files under a root directory, served by the app at
/// [`LocalStore::URL_PREFIX`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub const URL_PREFIX: &'static str = "/uploads";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let full_path = self.path_for(key)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Writing {} bytes to {}", data.len(), full_path.display());
        tokio::fs::write(&full_path, data).await?;
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.path_for(key)?;
        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let full_path = self.path_for(key)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_prefix(&self) -> String {
        Self::URL_PREFIX.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> LocalStore {
        LocalStore::new(std::env::temp_dir().join(format!("trip-board-{}", uuid::Uuid::new_v4())))
    }

    #[tokio::test]
    async fn stores_and_reads_back_objects() {
        let store = scratch_store();
        store
            .upload("gallery/1-a.png", b"png".to_vec(), Some("image/png"))
            .await
            .unwrap();
        assert_eq!(store.download("gallery/1-a.png").await.unwrap(), b"png");

        store.delete("gallery/1-a.png").await.unwrap();
        assert!(matches!(
            store.download("gallery/1-a.png").await,
            Err(StorageError::NotFound(_))
        ));
        // Deleting twice is not an error
        store.delete("gallery/1-a.png").await.unwrap();

        let _ = tokio::fs::remove_dir_all(store.root()).await;
    }

    #[tokio::test]
    async fn refuses_keys_outside_the_root() {
        let store = scratch_store();
        let result = store.upload("../escape.png", vec![0], None).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
