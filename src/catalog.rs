//! Service layer shared by the HTTP handlers and the CLI.
//!
//! A [`Catalog`] pairs the configured [`ItemStore`] with the
//! [`ImageStore`]; submitting an item stores the image first and records
//! the item against the image's content-addressed file name.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::images::ImageStore;
use crate::models::{Category, Item, NewItem, SearchHit, StoredImage};
use crate::store::{self, ItemStore};

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct AddedItem {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image: StoredImage,
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn ItemStore>,
    images: ImageStore,
}

impl Catalog {
    pub fn new(store: Arc<dyn ItemStore>, images: ImageStore) -> Self {
        Self { store, images }
    }

    /// Opens the configured backend and image directory.
    pub async fn open(config: &Config) -> Result<Self> {
        let store = store::open(config).await?;
        Ok(Self::new(store, ImageStore::from_config(&config.images)))
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Stores the image and records the item.
    ///
    /// Name and category are stored as given but must not be blank; the
    /// image must be non-empty.
    pub async fn add_item(&self, name: &str, category: &str, image: &[u8]) -> Result<AddedItem> {
        if name.trim().is_empty() {
            return Err(CatalogError::invalid("name is required"));
        }
        if category.trim().is_empty() {
            return Err(CatalogError::invalid("category is required"));
        }

        let stored = self.images.store(image).await?;
        let id = self
            .store
            .create(&NewItem {
                name: name.to_string(),
                category: category.to_string(),
                image_name: stored.file_name.clone(),
            })
            .await?;

        tracing::info!(
            "item received: {} (category: {}, image: {})",
            name,
            category,
            stored.file_name
        );

        Ok(AddedItem {
            id,
            name: name.to_string(),
            category: category.to_string(),
            image: stored,
        })
    }

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        self.store.list().await
    }

    pub async fn get_item(&self, id: i64) -> Result<Item> {
        self.store.get(id).await
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        self.store.search(keyword).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.store.categories().await
    }
}

/// CLI entry point for `catalog add`.
pub async fn run_add(
    config: &Config,
    name: &str,
    category: &str,
    image: &Path,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read image: {}", image.display()))?;

    let catalog = Catalog::open(config).await?;
    let added = catalog.add_item(name, category, &bytes).await?;

    println!("item received: {}", added.name);
    println!("id:       {}", added.id);
    println!("category: {}", added.category);
    println!("image:    {}", added.image.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json::JsonItemStore;
    use tempfile::TempDir;

    fn catalog_in(tmp: &TempDir) -> Catalog {
        let store = Arc::new(JsonItemStore::new(
            tmp.path().join("items.json"),
            "default.jpg",
        ));
        Catalog::new(
            store,
            ImageStore::new(tmp.path().join("images"), "default.jpg"),
        )
    }

    #[tokio::test]
    async fn test_add_item_links_image_by_hash() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog_in(&tmp);

        let added = catalog
            .add_item("Widget", "Toys", b"image-bytes")
            .await
            .unwrap();
        let item = catalog.get_item(added.id).await.unwrap();

        assert_eq!(item.image_name, added.image.file_name);
        assert_eq!(
            item.image_name,
            format!("{}.jpg", crate::images::content_hash(b"image-bytes"))
        );
        assert!(added.image.path.exists());
    }

    #[tokio::test]
    async fn test_add_item_stores_fields_verbatim() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog_in(&tmp);

        let padded = catalog.add_item("  Lamp ", " Home", b"x").await.unwrap();
        let plain = catalog.add_item("Lamp", "Home", b"y").await.unwrap();

        let item = catalog.get_item(padded.id).await.unwrap();
        assert_eq!(item.name, "  Lamp ");
        assert_eq!(item.category, " Home");
        assert_eq!(catalog.get_item(plain.id).await.unwrap().category, "Home");
        assert_eq!(catalog.categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_before_storing() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog_in(&tmp);

        let err = catalog.add_item(" ", "Toys", b"x").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
        let err = catalog.add_item("Widget", "", b"x").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));

        assert!(!catalog.images().dir().exists());
        assert!(catalog.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_image_rejected() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog_in(&tmp);

        let err = catalog.add_item("Widget", "Toys", b"").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
        assert!(catalog.list_items().await.unwrap().is_empty());
    }
}
