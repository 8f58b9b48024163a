//! Item repository abstraction.
//!
//! The [`ItemStore`] trait is the only way the rest of the crate touches
//! persisted items and categories, so the backend (SQLite tables or a
//! single JSON document) is a configuration choice rather than a code path.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.

pub mod json;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::models::{Category, Item, NewItem, SearchHit};

/// Abstract storage backend for items.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create`](ItemStore::create) | Get-or-insert the category, insert the item, return its id |
/// | [`list`](ItemStore::list) | All items in insertion order |
/// | [`get`](ItemStore::get) | One item by id, or `NotFound` |
/// | [`search`](ItemStore::search) | Case-insensitive substring match on item names |
/// | [`categories`](ItemStore::categories) | All categories in id order |
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Inserts a new item, creating its category on first use.
    ///
    /// Concurrent creates naming the same new category end up sharing a
    /// single category row.
    async fn create(&self, item: &NewItem) -> Result<i64>;

    async fn list(&self) -> Result<Vec<Item>>;

    /// Fails with [`CatalogError::NotFound`](crate::error::CatalogError::NotFound)
    /// for an id that was never issued.
    async fn get(&self, id: i64) -> Result<Item>;

    /// An empty result is not an error.
    async fn search(&self, keyword: &str) -> Result<Vec<SearchHit>>;

    async fn categories(&self) -> Result<Vec<Category>>;
}

/// Opens the backend selected by `[db].backend`.
pub async fn open(config: &Config) -> Result<Arc<dyn ItemStore>> {
    let path = config.db.resolved_path();
    let store: Arc<dyn ItemStore> = match config.db.backend {
        Backend::Sqlite => Arc::new(sqlite::SqliteItemStore::connect(&path).await?),
        Backend::Json => Arc::new(json::JsonItemStore::new(
            &path,
            &config.images.default_image,
        )),
    };
    Ok(store)
}

/// Case-insensitive substring match used by backends that filter in Rust.
pub(crate) fn matches_keyword(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}
