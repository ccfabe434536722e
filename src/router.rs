use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, get_service, post},
};
use axum_login::{
    AuthManagerLayerBuilder, login_required,
    tower_sessions::{Expiry, SessionManagerLayer, SessionStore, cookie::SameSite},
};
use chrono::NaiveDate;
use minijinja::Environment;
use sea_orm::DatabaseConnection;
use tokio::{signal, task::AbortHandle};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::error;

use crate::{
    auth::{
        router as auth_router,
        user::Backend,
    },
    entities::sea_orm_active_enums::{TripGender, TripLocation},
    error::AppError,
    routes::{admin, api, trips},
    storage::ObjectStore,
    trips::{ImageResolver, view::embed_url},
    util::asset_loader::AssetLoader,
};

/// Largest accepted admin form, files included.
const UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ObjectStore>,
    pub resolver: ImageResolver,
    pub templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>, default_image: &str) -> Self {
        let resolver = ImageResolver::new(store.public_prefix(), default_image);
        Self {
            db,
            store,
            resolver,
            templates: Arc::new(setup_templates()),
        }
    }

    pub fn render(&self, name: &str, ctx: minijinja::Value) -> Result<Html<String>, AppError> {
        let tmpl = self.templates.get_template(name)?;
        Ok(Html(tmpl.render(ctx)?))
    }
}

pub fn create_router<S>(
    state: AppState,
    backend: Backend,
    session_store: S,
    uploads_dir: Option<PathBuf>,
) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnSessionEnd);

    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/trips/new", get(admin::new_trip).post(admin::create_trip))
        .route(
            "/admin/trips/{id}/edit",
            get(admin::edit_trip).post(admin::update_trip),
        )
        .route("/admin/trips/{id}/status", post(admin::set_status))
        .route("/admin/trips/{id}/duplicate", post(admin::duplicate_trip))
        .route("/admin/trips/{id}/thumbnail", post(admin::select_thumbnail))
        .route("/admin/trips/{id}/videos", post(admin::add_video))
        .route("/admin/images/{image_id}/flyer", post(admin::set_flyer))
        .route("/admin/images/{image_id}/delete", post(admin::delete_image))
        .route("/admin/videos/{video_id}/delete", post(admin::delete_video))
        .route_layer(login_required!(Backend, login_url = "/admin/login"))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT));

    let mut app = Router::new()
        .route("/", get(trips::index))
        .route("/trip/{trip_id}", get(trips::detail))
        .route("/api/trips", get(api::list_trips))
        .route("/api/trips/{trip_id}", get(api::show_trip))
        .merge(admin_routes)
        .merge(auth_router::router())
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new("static")));

    if let Some(dir) = uploads_dir {
        app = app.nest_service("/uploads", get_service(ServeDir::new(dir)));
    }

    app.layer(auth_layer).layer(TraceLayer::new_for_http())
}

fn location_label(value: String) -> String {
    value
        .parse::<TripLocation>()
        .map(|l| l.label().to_string())
        .unwrap_or(value)
}

fn gender_label(value: String) -> String {
    value
        .parse::<TripGender>()
        .map(|g| g.label().to_string())
        .unwrap_or(value)
}

/// `2025-07-01` becomes `Jul 1, 2025`; anything else passes through.
fn human_date(value: String) -> String {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or(value)
}

fn video_embed(link: String) -> Option<String> {
    embed_url(&link)
}

fn setup_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader("templates"));
    env.add_filter("location_label", location_label);
    env.add_filter("gender_label", gender_label);
    env.add_filter("human_date", human_date);
    env.add_filter("video_embed", video_embed);
    let asset_loader = AssetLoader::default();
    asset_loader.register(&mut env);
    env
}

pub async fn shutdown_signal(deletion_task_abort_handle: AbortHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { deletion_task_abort_handle.abort() },
        _ = terminate => { deletion_task_abort_handle.abort() },
    }
}
