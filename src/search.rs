use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;

/// CLI entry point for `catalog search`.
pub async fn run_search(config: &Config, keyword: &str) -> Result<()> {
    let catalog = Catalog::open(config).await?;
    let hits = catalog.search(keyword).await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. {} [{}]", i + 1, hit.name, hit.category);
    }
    Ok(())
}
