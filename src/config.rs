use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::{LocalStore, ObjectStore, SupabaseStore};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Local {
        path: PathBuf,
    },
    Supabase {
        url: String,
        service_key: String,
        bucket: String,
    },
}

impl StorageConfig {
    pub fn build(&self) -> Arc<dyn ObjectStore> {
        match self {
            StorageConfig::Local { path } => Arc::new(LocalStore::new(path.clone())),
            StorageConfig::Supabase {
                url,
                service_key,
                bucket,
            } => Arc::new(SupabaseStore::new(url, bucket, service_key)),
        }
    }

    /// Directory the app serves at `/uploads`, for the local backend only.
    pub fn served_dir(&self) -> Option<PathBuf> {
        match self {
            StorageConfig::Local { path } => Some(path.clone()),
            StorageConfig::Supabase { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub admin_password_hash: String,
    pub storage: StorageConfig,
    pub default_image: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variables may come from the environment.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let storage = match var("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                path: var("LOCAL_STORAGE_PATH")
                    .unwrap_or_else(|| "uploads".into())
                    .into(),
            },
            "supabase" => StorageConfig::Supabase {
                url: required("SUPABASE_URL")?,
                service_key: required("SUPABASE_SERVICE_KEY")?,
                bucket: var("STORAGE_BUCKET").unwrap_or_else(|| "trip-photos".into()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "debug".into()),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            admin_password_hash: required("ADMIN_PASSWORD_HASH")?,
            storage,
            default_image: var("DEFAULT_IMAGE")
                .unwrap_or_else(|| "/static/placeholder.svg".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/trips"),
        ("ADMIN_PASSWORD_HASH", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"),
    ];

    #[test]
    fn defaults_to_local_storage() {
        let config = config(&BASE).unwrap();
        assert_eq!(config.rust_log, "debug");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.default_image, "/static/placeholder.svg");
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                path: "uploads".into()
            }
        );
        assert_eq!(config.storage.served_dir(), Some(PathBuf::from("uploads")));
    }

    #[test]
    fn reads_supabase_settings() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("STORAGE_BACKEND", "supabase"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service-key"),
        ]);
        let config = config(&vars).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Supabase {
                url: "https://abc.supabase.co".into(),
                service_key: "service-key".into(),
                bucket: "trip-photos".into(),
            }
        );
        assert!(config.storage.served_dir().is_none());
        assert_eq!(
            config.storage.build().public_prefix(),
            "https://abc.supabase.co/storage/v1/object/public/trip-photos"
        );
    }

    #[test]
    fn reports_missing_and_invalid_values() {
        assert!(matches!(
            config(&[("DATABASE_URL", "postgres://x")]),
            Err(ConfigError::Missing("ADMIN_PASSWORD_HASH"))
        ));

        let mut vars = BASE.to_vec();
        vars.push(("STORAGE_BACKEND", "supabase"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::Missing("SUPABASE_URL"))
        ));

        let mut vars = BASE.to_vec();
        vars.push(("STORAGE_BACKEND", "ftp"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::Invalid { name: "STORAGE_BACKEND", .. })
        ));
    }
}
