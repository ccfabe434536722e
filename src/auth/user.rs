use std::fmt;
use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use axum_login::{AuthUser, AuthnBackend, UserId};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::task;
use tracing::{debug, warn};

pub const ADMIN_ID: i32 = 1;

/// The single administrator. There are no per-user accounts.
#[derive(Clone)]
pub struct Admin {
    auth_hash: Vec<u8>,
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin").field("id", &ADMIN_ID).finish()
    }
}

impl AuthUser for Admin {
    type Id = i32;

    fn id(&self) -> Self::Id {
        ADMIN_ID
    }

    // Derived from the configured password hash, so changing the password
    // signs every session out.
    fn session_auth_hash(&self) -> &[u8] {
        &self.auth_hash
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid admin password hash: {0}")]
    InvalidHash(String),

    #[error(transparent)]
    TaskJoin(#[from] task::JoinError),
}

#[derive(Debug, Clone)]
pub struct Backend {
    password_hash: Arc<str>,
    admin: Admin,
}

impl Backend {
    /// `password_hash` is an argon2 PHC string, as printed by the `hash_password` binary.
    pub fn new(password_hash: &str) -> Result<Self, BackendError> {
        let password_hash = password_hash.trim();
        PasswordHash::new(password_hash).map_err(|e| BackendError::InvalidHash(e.to_string()))?;
        Ok(Self {
            password_hash: Arc::from(password_hash),
            admin: Admin {
                auth_hash: Sha256::digest(password_hash.as_bytes()).to_vec(),
            },
        })
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Admin;
    type Credentials = Credentials;
    type Error = BackendError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let hash = self.password_hash.clone();
        // Verification is CPU bound and runs on the blocking pool.
        let verified = task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| BackendError::InvalidHash(e.to_string()))?;
            Ok::<bool, BackendError>(
                Argon2::default()
                    .verify_password(creds.password.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await??;

        if verified {
            debug!("Admin password accepted");
            Ok(Some(self.admin.clone()))
        } else {
            warn!("Rejected admin login attempt");
            Ok(None)
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok((*user_id == ADMIN_ID).then(|| self.admin.clone()))
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;
