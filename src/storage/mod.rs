//! Object storage for trip images.
//!
//! Everything uploaded lives in one bucket under two prefixes, `brochures/` and
//! `gallery/`, keyed `{prefix}/{unix_millis}-{file_name}`. Rows store these keys,
//! never URLs; turning a key into something a browser can fetch is the job of
//! [`crate::trips::images::ImageResolver`].

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

pub mod local;
#[cfg(test)]
pub mod memory;
pub mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStore;

pub const BROCHURE_PREFIX: &str = "brochures";
pub const GALLERY_PREFIX: &str = "gallery";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object `{0}` not found")]
    NotFound(String),

    #[error("invalid object key `{0}`")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("storage responded {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// URL prefix under which stored keys are publicly readable.
    fn public_prefix(&self) -> String;
}

/// Builds a fresh key for an uploaded file.
pub fn object_key(prefix: &str, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        prefix.trim_matches('/'),
        Utc::now().timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Reduces a client supplied file name to `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Last segment of a key.
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Everything before the last `/`, if the key has a directory part.
pub fn prefix_of(key: &str) -> Option<&str> {
    key.rsplit_once('/')
        .map(|(prefix, _)| prefix)
        .filter(|p| !p.is_empty())
}

/// Rejects keys that could escape the bucket.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Tracks objects written during a multi-step operation so they can be removed
/// again if a later step fails.
pub struct UploadedObjects<'a> {
    store: &'a dyn ObjectStore,
    keys: Vec<String>,
}

impl<'a> UploadedObjects<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            keys: Vec::new(),
        }
    }

    pub fn store(&self) -> &'a dyn ObjectStore {
        self.store
    }

    pub async fn upload(
        &mut self,
        key: String,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        self.store.upload(&key, data, content_type).await?;
        self.keys.push(key.clone());
        Ok(key)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Best-effort removal of everything uploaded so far.
    pub async fn discard(self) {
        for key in &self.keys {
            if let Err(e) = self.store.delete(key).await {
                warn!("Failed to remove uploaded object {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_prefixed_and_timestamped() {
        let key = object_key("gallery", "beach day.png");
        let (prefix, name) = key.split_once('/').unwrap();
        assert_eq!(prefix, "gallery");
        let (millis, file) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(file, "beach_day.png");
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\flyer.jpg"), "flyer.jpg");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("   "), "file");
        assert_eq!(sanitize_file_name("חוף.png"), "___.png");
    }

    #[test]
    fn key_parts() {
        assert_eq!(file_name_of("gallery/1700-f.png"), "1700-f.png");
        assert_eq!(prefix_of("gallery/1700-f.png"), Some("gallery"));
        assert_eq!(file_name_of("f.png"), "f.png");
        assert_eq!(prefix_of("f.png"), None);
    }

    #[test]
    fn traversal_keys_are_rejected() {
        assert!(check_key("gallery/a.png").is_ok());
        assert!(check_key("../a.png").is_err());
        assert!(check_key("/etc/passwd").is_err());
        assert!(check_key("gallery//a.png").is_err());
        assert!(check_key("").is_err());
    }

    #[tokio::test]
    async fn discard_removes_tracked_uploads() {
        let store = memory::MemoryStore::default();
        let mut uploaded = UploadedObjects::new(&store);
        uploaded
            .upload("gallery/1-a.png".into(), vec![1], None)
            .await
            .unwrap();
        uploaded
            .upload("gallery/2-b.png".into(), vec![2], None)
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
        uploaded.discard().await;
        assert_eq!(store.len(), 0);
    }
}
