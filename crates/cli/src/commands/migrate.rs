//! Database migration command.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;

/// Run the order service migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the connection fails, or a
/// migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
