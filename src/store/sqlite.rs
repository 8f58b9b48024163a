//! SQLite-backed [`ItemStore`] implementation.
//!
//! Items live in `items(id, name, category_id, image_name)` and point at
//! `categories(id, name UNIQUE)`. Ids come from SQLite's rowid allocator.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::db;
use crate::error::{CatalogError, Result};
use crate::migrate;
use crate::models::{Category, Item, NewItem, SearchHit};

use super::{matches_keyword, ItemStore};

const SELECT_ITEMS: &str = r#"
    SELECT items.id, items.name, categories.name AS category, items.image_name
    FROM items
    JOIN categories ON categories.id = items.category_id
"#;

pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Wraps a pool whose schema is already in place.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `path` and applies the schema.
    pub async fn connect(path: &Path) -> Result<Self> {
        let pool = db::connect(path).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

fn item_from_row(row: &SqliteRow) -> Item {
    Item {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        image_name: row.get("image_name"),
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn create(&self, item: &NewItem) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        // The UNIQUE constraint on name makes this a get-or-insert even when
        // two requests introduce the same category at once.
        sqlx::query("INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(&item.category)
            .execute(&mut *tx)
            .await?;

        let category_id: i64 = sqlx::query_scalar("SELECT id FROM categories WHERE name = ?")
            .bind(&item.category)
            .fetch_one(&mut *tx)
            .await?;

        let inserted =
            sqlx::query("INSERT INTO items (name, category_id, image_name) VALUES (?, ?, ?)")
                .bind(&item.name)
                .bind(category_id)
                .bind(&item.image_name)
                .execute(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(inserted.last_insert_rowid())
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query(&format!("{} ORDER BY items.id ASC", SELECT_ITEMS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn get(&self, id: i64) -> Result<Item> {
        let row = sqlx::query(&format!("{} WHERE items.id = ?", SELECT_ITEMS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(item_from_row)
            .ok_or_else(|| CatalogError::not_found(format!("item {}", id)))
    }

    async fn search(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        // SQLite's lower() folds ASCII only, so matching happens in Rust with
        // the same rule the JSON backend uses.
        let rows = sqlx::query(
            r#"
            SELECT items.name, categories.name AS category
            FROM items
            JOIN categories ON categories.id = items.category_id
            ORDER BY items.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SearchHit {
                name: row.get("name"),
                category: row.get("category"),
            })
            .filter(|hit| matches_keyword(&hit.name, keyword))
            .collect())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Category {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}
