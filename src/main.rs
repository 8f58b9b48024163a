//! # Catalog CLI (`catalog`)
//!
//! The `catalog` binary runs the HTTP server and offers the same item
//! operations from the command line.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog init` | Create the storage backend and the images directory |
//! | `catalog serve` | Start the HTTP server |
//! | `catalog add` | Submit an item with an image file |
//! | `catalog list` | List all items |
//! | `catalog get <id>` | Show one item |
//! | `catalog search <keyword>` | Search item names |
//! | `catalog categories` | List categories |
//!
//! ## Examples
//!
//! ```bash
//! catalog init --config ./config/catalog.toml
//! catalog add --name Widget --category Toys --image ./widget.jpg
//! catalog search wid
//! FRONT_URL=http://localhost:3000 catalog serve
//! ```

use clap::{Parser, Subcommand};
use item_catalog::{catalog, config, get, migrate, search, server};
use std::path::PathBuf;

/// Item catalog: submit, browse and search items with images.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Missing files fall back to built-in defaults.
#[derive(Parser)]
#[command(name = "catalog", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema (or empty JSON document) and images directory.
    ///
    /// Idempotent.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Submit an item from the command line.
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        /// Path to the image file to upload.
        #[arg(long)]
        image: PathBuf,
    },

    /// List all items in insertion order.
    List,

    /// Show a single item by id.
    Get { id: i64 },

    /// Case-insensitive substring search on item names.
    Search { keyword: String },

    /// List all categories.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Catalog initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Add {
            name,
            category,
            image,
        } => {
            catalog::run_add(&cfg, &name, &category, &image).await?;
        }
        Commands::List => {
            get::run_list(&cfg).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, id).await?;
        }
        Commands::Search { keyword } => {
            search::run_search(&cfg, &keyword).await?;
        }
        Commands::Categories => {
            get::run_categories(&cfg).await?;
        }
    }

    Ok(())
}
