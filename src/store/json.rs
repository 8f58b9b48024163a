//! JSON-document-backed [`ItemStore`] implementation.
//!
//! The whole catalog is one file:
//!
//! ```json
//! {
//!   "categories": [{ "id": 1, "name": "Toys" }],
//!   "items": [{ "id": 1, "name": "Widget", "category_id": 1, "image_name": "ab12….jpg" }]
//! }
//! ```
//!
//! Writers hold a process-wide mutex for the full read-modify-write cycle
//! and replace the file by renaming a freshly written sibling, so readers
//! never observe a half-written document. Ids are derived from the
//! persisted items (`max + 1`) and survive restarts.
//!
//! Documents written by older revisions, a bare array of
//! `{name, category, image_name?, id?}` records or the same array under an
//! `items` key, are normalized on read and rewritten in the current shape
//! on the next create.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{CatalogError, Result};
use crate::models::{Category, Item, NewItem, SearchHit};

use super::{matches_keyword, ItemStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    categories: Vec<Category>,
    items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemRecord {
    id: i64,
    name: String,
    category_id: i64,
    image_name: String,
}

#[derive(Debug, Deserialize)]
struct LegacyItem {
    #[serde(default)]
    id: Option<i64>,
    name: String,
    category: String,
    #[serde(default)]
    image_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Current(CatalogDocument),
    Wrapped { items: Vec<LegacyItem> },
    Bare(Vec<LegacyItem>),
}

impl CatalogDocument {
    fn category_id_or_insert(&mut self, name: &str) -> i64 {
        if let Some(existing) = self.categories.iter().find(|c| c.name == name) {
            return existing.id;
        }
        let id = self.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    fn next_item_id(&self) -> i64 {
        self.items.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }

    fn category_name(&self, id: i64) -> Result<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
            .ok_or_else(|| {
                CatalogError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("item document references unknown category {}", id),
                ))
            })
    }

    fn resolve(&self, record: &ItemRecord) -> Result<Item> {
        Ok(Item {
            id: record.id,
            name: record.name.clone(),
            category: self.category_name(record.category_id)?.to_string(),
            image_name: record.image_name.clone(),
        })
    }

    fn from_legacy(items: Vec<LegacyItem>, default_image: &str) -> Self {
        let mut doc = CatalogDocument::default();
        let mut used: HashSet<i64> = HashSet::new();
        let mut next_id = items.iter().filter_map(|i| i.id).max().unwrap_or(0) + 1;

        for legacy in items {
            let category_id = doc.category_id_or_insert(&legacy.category);
            let id = match legacy.id {
                Some(id) if !used.contains(&id) => id,
                _ => {
                    let id = next_id;
                    next_id += 1;
                    id
                }
            };
            used.insert(id);
            doc.items.push(ItemRecord {
                id,
                name: legacy.name,
                category_id,
                image_name: legacy
                    .image_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| default_image.to_string()),
            });
        }

        doc
    }
}

pub struct JsonItemStore {
    path: PathBuf,
    default_image: String,
    write_lock: Mutex<()>,
}

impl JsonItemStore {
    pub fn new(path: impl AsRef<Path>, default_image: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default_image: default_image.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Writes an empty document if none exists yet.
    pub async fn ensure_document(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !tokio::fs::try_exists(&self.path).await? {
            self.write_document(&CatalogDocument::default()).await?;
        }
        Ok(())
    }

    async fn read_document(&self) -> Result<CatalogDocument> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CatalogDocument::default())
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(CatalogDocument::default());
        }

        let doc = match serde_json::from_slice::<OnDisk>(&bytes)? {
            OnDisk::Current(doc) => doc,
            OnDisk::Wrapped { items } | OnDisk::Bare(items) => {
                tracing::info!(
                    "normalizing legacy item document {} ({} items)",
                    self.path.display(),
                    items.len()
                );
                CatalogDocument::from_legacy(items, &self.default_image)
            }
        };
        Ok(doc)
    }

    async fn write_document(&self, doc: &CatalogDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(doc)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for JsonItemStore {
    async fn create(&self, item: &NewItem) -> Result<i64> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.read_document().await?;
        let category_id = doc.category_id_or_insert(&item.category);
        let id = doc.next_item_id();
        doc.items.push(ItemRecord {
            id,
            name: item.name.clone(),
            category_id,
            image_name: item.image_name.clone(),
        });

        self.write_document(&doc).await?;
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let doc = self.read_document().await?;
        doc.items.iter().map(|r| doc.resolve(r)).collect()
    }

    async fn get(&self, id: i64) -> Result<Item> {
        let doc = self.read_document().await?;
        let record = doc
            .items
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| CatalogError::not_found(format!("item {}", id)))?;
        doc.resolve(record)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        let doc = self.read_document().await?;
        doc.items
            .iter()
            .filter(|r| matches_keyword(&r.name, keyword))
            .map(|r| doc.resolve(r).map(SearchHit::from))
            .collect()
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.read_document().await?.categories;
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }
}
