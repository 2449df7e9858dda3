//! Database connection pool management and schema migrations.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Run idempotent schema migrations.
///
/// The `translation` table carries the fixed column set shared by all
/// object types; the unique index on the composite key is what makes
/// concurrent saves to the same key safe (the upsert relies on it).
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translation (
            id BIGSERIAL PRIMARY KEY,
            object_id BIGINT NOT NULL,
            object_type TEXT NOT NULL,
            language_code VARCHAR(20) NOT NULL,
            original_language VARCHAR(20) NOT NULL,
            translated_content TEXT,
            translated_title TEXT,
            translated_excerpt TEXT,
            translated_slug VARCHAR(200),
            translated_attr_title TEXT,
            translated_description TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            last_updated TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create translation table")?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS translation_object_language
        ON translation (object_id, object_type, language_code)
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create translation unique index")?;

    // Single-column indexes for the filtered report queries.
    for (name, column) in [
        ("translation_object_id", "object_id"),
        ("translation_object_type", "object_type"),
        ("translation_language_code", "language_code"),
    ] {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {name} ON translation ({column})"
        ))
        .execute(pool)
        .await
        .with_context(|| format!("failed to create index {name}"))?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS setting (
            key TEXT PRIMARY KEY,
            value JSONB NOT NULL,
            updated TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create setting table")?;

    Ok(())
}

/// Check if the database connection is healthy.
pub async fn check_health(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}
