use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use minijinja::{Environment, Error, State};
use sha2::{Digest, Sha256};

/// Hands out `/static/...` URLs with a content hash for cache busting.
///
/// Hashes are computed once per path; clones share the cache.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new("static")
    }
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Arc::default(),
        }
    }

    pub fn asset_path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if let Some(hashed_path) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
        {
            return hashed_path.clone();
        }

        match fs::read(self.root.join(path)) {
            Ok(contents) => {
                let hash = Sha256::digest(contents);
                let hashed_path = format!("/static/{}?v={:.16x}", path, hash);
                self.cache
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(path.to_string(), hashed_path.clone());
                hashed_path
            }
            Err(_) => format!("/static/{}", path),
        }
    }

    pub fn register(&self, env: &mut Environment<'_>) {
        let loader = self.clone();
        env.add_function("asset", move |_state: &State, path: String| -> Result<String, Error> {
            Ok(loader.asset_path(&path))
        });
    }
}
