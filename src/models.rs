//! Core data models used throughout the catalog.
//!
//! Items and categories are write-once: nothing here is ever updated or
//! deleted after creation.

use serde::{Deserialize, Serialize};

/// An item as handed back to callers, with its category resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_name: String,
}

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub image_name: String,
}

/// A normalized category row. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// One keyword search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub category: String,
}

impl From<Item> for SearchHit {
    fn from(item: Item) -> Self {
        Self {
            name: item.name,
            category: item.category,
        }
    }
}

/// A blob persisted in the image directory under its content digest.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Lowercase hex SHA-256 of the bytes.
    pub content_hash: String,
    /// `<content_hash>.jpg`, the value stored as an item's `image_name`.
    pub file_name: String,
    pub path: std::path::PathBuf,
}
