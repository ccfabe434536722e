//! In-memory [`ObjectStore`] used by tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ObjectStore, StorageError};

pub const PUBLIC_PREFIX: &str = "https://cdn.test/storage/v1/object/public/trip-photos";

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Number of uploads allowed to succeed before every further upload fails.
    upload_budget: Mutex<Option<usize>>,
    uploads: AtomicUsize,
}

impl MemoryStore {
    pub fn with_objects<'a>(objects: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        let store = Self::default();
        {
            let mut map = store.objects.lock().unwrap();
            for (key, data) in objects {
                map.insert(key.to_string(), data.to_vec());
            }
        }
        store
    }

    pub fn fail_uploads_after(&self, n: usize) {
        *self.upload_budget.lock().unwrap() = Some(n);
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let done = self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(budget) = *self.upload_budget.lock().unwrap() {
            if done >= budget {
                return Err(StorageError::Status {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    body: "upload refused".into(),
                });
            }
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_prefix(&self) -> String {
        PUBLIC_PREFIX.to_string()
    }
}
