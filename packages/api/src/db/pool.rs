use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::error::ApiError;
use crate::settings::settings;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

pub async fn get_pool() -> Result<&'static PgPool, ApiError> {
    POOL.get_or_try_init(|| async {
        let database = &settings().database;
        let url = database.url.as_deref().ok_or(ApiError::MissingDatabaseUrl)?;

        tracing::info!(max_connections = database.max_connections, "connecting to database");
        let pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .connect(url)
            .await?;
        Ok(pool)
    })
    .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), ApiError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
