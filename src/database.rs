use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, sqlx::PgPool};
use tracing::info;

/// Connects, runs pending migrations and opens a second pool for the session store.
pub async fn setup_database(db_url: &str) -> anyhow::Result<(DatabaseConnection, PgPool)> {
    let db = Database::connect(db_url).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations applied");

    let pool = PgPool::connect(db_url).await?;

    Ok((db, pool))
}
