use axum_login::tower_sessions::ExpiredDeletion;
use tokio::net::TcpListener;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trip_board::{
    auth::user::Backend,
    config::Config,
    database::setup_database,
    router::{AppState, create_router, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (db, pool) = setup_database(&config.database_url).await?;

    let session_store = PostgresStore::new(pool);
    session_store.migrate().await?;

    let deletion_task = tokio::task::spawn(
        session_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
    );

    let store = config.storage.build();
    let state = AppState::new(db, store, &config.default_image);
    let backend = Backend::new(&config.admin_password_hash)?;
    let app = create_router(state, backend, session_store, config.storage.served_dir());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(deletion_task.abort_handle()))
        .await?;

    // The deletion task is aborted on shutdown
    match deletion_task.await {
        Ok(result) => result?,
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
