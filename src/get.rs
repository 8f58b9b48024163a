//! Item and category retrieval for the CLI.
//!
//! `catalog list`, `catalog get <id>` and `catalog categories` print what
//! `GET /items`, `GET /items/{id}` and `GET /categories` return.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::Item;

fn print_item(item: &Item) {
    println!("id:         {}", item.id);
    println!("name:       {}", item.name);
    println!("category:   {}", item.category);
    println!("image_name: {}", item.image_name);
}

/// CLI entry point for `catalog list`.
pub async fn run_list(config: &Config) -> Result<()> {
    let catalog = Catalog::open(config).await?;
    let items = catalog.list_items().await?;

    if items.is_empty() {
        println!("No items.");
        return Ok(());
    }

    for item in &items {
        println!(
            "{}. {} [{}] {}",
            item.id, item.name, item.category, item.image_name
        );
    }
    Ok(())
}

/// CLI entry point for `catalog get`.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let catalog = Catalog::open(config).await?;
    let item = match catalog.get_item(id).await {
        Ok(item) => item,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    print_item(&item);
    Ok(())
}

/// CLI entry point for `catalog categories`.
pub async fn run_categories(config: &Config) -> Result<()> {
    let catalog = Catalog::open(config).await?;
    let categories = catalog.categories().await?;

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    for category in &categories {
        println!("{}. {}", category.id, category.name);
    }
    Ok(())
}
