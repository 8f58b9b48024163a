//! # Item Catalog
//!
//! A small HTTP service for submitting and browsing catalog items.
//!
//! Clients post an item (name, category, image); the image is stored under
//! its SHA-256 digest and the item is recorded in either a SQLite database
//! or a single JSON document. Items can then be listed, fetched by id,
//! searched by keyword, and their images retrieved.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────────────┐
//! │   HTTP   │──▶│ Catalog  │──▶│ ItemStore          │
//! │  (axum)  │   │ service  │   │ SQLite | JSON file │
//! └──────────┘   └────┬─────┘   └────────────────────┘
//! ┌──────────┐        │         ┌────────────────────┐
//! │   CLI    │────────┘────────▶│ ImageStore         │
//! │(catalog) │                  │ images/<sha256>.jpg│
//! └──────────┘                  └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and `FRONT_URL` override |
//! | [`error`] | Error taxonomy and HTTP status mapping |
//! | [`models`] | Core data types |
//! | [`images`] | Content-addressed image storage |
//! | [`store`] | Item repository trait and its SQLite / JSON backends |
//! | [`db`] | SQLite connection |
//! | [`migrate`] | Schema creation |
//! | [`catalog`] | Service layer shared by HTTP and CLI |
//! | [`server`] | HTTP server |
//! | [`get`] | CLI item retrieval |
//! | [`search`] | CLI keyword search |

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod get;
pub mod images;
pub mod migrate;
pub mod models;
pub mod search;
pub mod server;
pub mod store;
