use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::{Backend, Config};
use crate::db;
use crate::images::ImageStore;
use crate::store::json::JsonItemStore;

/// Creates the `categories` and `items` tables if they are missing.
pub async fn apply_schema(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            image_name TEXT NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_category_id ON items(category_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Prepares the configured backend and the images directory. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let db_path = config.db.resolved_path();

    match config.db.backend {
        Backend::Sqlite => {
            let pool = db::connect(&db_path)
                .await
                .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
            apply_schema(&pool).await?;
            pool.close().await;
        }
        Backend::Json => {
            JsonItemStore::new(&db_path, &config.images.default_image)
                .ensure_document()
                .await
                .with_context(|| format!("Failed to create item document: {}", db_path.display()))?;
        }
    }

    ImageStore::from_config(&config.images)
        .ensure_dir()
        .await
        .with_context(|| {
            format!(
                "Failed to create images directory: {}",
                config.images.dir.display()
            )
        })?;

    tracing::info!(
        "storage ready ({:?} at {})",
        config.db.backend,
        db_path.display()
    );
    Ok(())
}
