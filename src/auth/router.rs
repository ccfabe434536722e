use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use minijinja::context;
use serde::Deserialize;
use tracing::{error, info};

use super::user::{AuthSession, Credentials};
use crate::error::AppError;
use crate::router::AppState;

pub const LOGIN_PATH: &str = "/admin/login";
const ADMIN_HOME: &str = "/admin";

// This allows us to extract the "next" field from the query string. We use this
// to redirect after log in.
#[derive(Debug, Deserialize)]
pub struct NextUrl {
    next: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(self::get::login).post(self::post::login))
        .route("/admin/logout", get(self::get::logout))
}

/// Only admin pages are valid targets after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if (path == ADMIN_HOME || path.starts_with("/admin/") || path.starts_with("/admin?"))
                && !path.starts_with(LOGIN_PATH) =>
        {
            path
        }
        _ => ADMIN_HOME,
    }
}

fn login_page(
    state: &AppState,
    status: StatusCode,
    next: Option<&str>,
    failed: bool,
) -> Result<Response, AppError> {
    let html = state.render(
        "admin/login.html",
        context! {
            next => next,
            failed => failed,
        },
    )?;
    Ok((status, html).into_response())
}

mod post {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        mut auth_session: AuthSession,
        Form(creds): Form<Credentials>,
    ) -> Result<Response, AppError> {
        let next = creds.next.clone();
        let admin = match auth_session.authenticate(creds).await {
            Ok(Some(admin)) => admin,
            Ok(None) => {
                return login_page(&state, StatusCode::UNAUTHORIZED, next.as_deref(), true);
            }
            Err(e) => {
                error!("Admin authentication failed: {}", e);
                return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }
        };

        if let Err(e) = auth_session.login(&admin).await {
            error!("Could not store admin session: {}", e);
            return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
        info!("Admin logged in");

        Ok(Redirect::to(safe_next(next.as_deref())).into_response())
    }
}

mod get {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        Query(NextUrl { next }): Query<NextUrl>,
    ) -> Result<Response, AppError> {
        login_page(&state, StatusCode::OK, next.as_deref(), false)
    }

    pub async fn logout(mut auth_session: AuthSession) -> impl IntoResponse {
        match auth_session.logout().await {
            Ok(_) => Redirect::to("/").into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_limited_to_admin_pages() {
        assert_eq!(safe_next(None), "/admin");
        assert_eq!(safe_next(Some("/admin/trips/3/edit")), "/admin/trips/3/edit");
        assert_eq!(
            safe_next(Some("/admin?show_deleted=true")),
            "/admin?show_deleted=true"
        );
        assert_eq!(safe_next(Some("https://evil.example")), "/admin");
        assert_eq!(safe_next(Some("//evil.example/admin")), "/admin");
        assert_eq!(safe_next(Some("/administrator")), "/admin");
        assert_eq!(safe_next(Some("/admin/login")), "/admin");
    }
}
