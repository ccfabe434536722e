//! Single-administrator login over axum-login sessions.

pub mod router;
pub mod user;
