//! HTTP server.
//!
//! Exposes the catalog as a small JSON API for the web frontend.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness greeting |
//! | `POST` | `/items` | Submit an item (multipart: `name`, `category`, file `image`) |
//! | `GET`  | `/items` | List all items |
//! | `GET`  | `/items/{item_id}` | One item by id |
//! | `GET`  | `/search?keyword=` | Case-insensitive name search |
//! | `GET`  | `/categories` | All categories |
//! | `GET`  | `/image/{image_filename}` | Image bytes, placeholder when missing |
//!
//! # Error Contract
//!
//! Every error response is a JSON envelope with a human-readable message:
//!
//! ```json
//! { "message": "image path does not end with .jpg" }
//! ```
//!
//! Invalid input maps to 400, unknown items to 404, and storage or
//! filesystem failures to 500.
//!
//! # CORS
//!
//! Only the configured frontend origin (`[server].front_url`, or the
//! `FRONT_URL` environment variable) may call the API from a browser.

use anyhow::Context;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::config::{Config, ServerConfig};
use crate::error::CatalogError;
use crate::models::{Category, Item, SearchHit};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
}

/// Starts the HTTP server.
///
/// Opens the configured backend (creating the SQLite schema if needed),
/// binds to `[server].bind` and serves until the process is terminated.
/// A bind failure is returned as an error.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::open(config)
        .await
        .context("Failed to open item store")?;
    catalog.images().ensure_dir().await?;

    let app = router(Arc::new(catalog), &config.server)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!("catalog server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router with CORS restricted to `front_url` and
/// request bodies capped at `max_upload_bytes`.
pub fn router(catalog: Arc<Catalog>, server: &ServerConfig) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(&server.front_url)
        .with_context(|| format!("Invalid front_url: {}", server.front_url))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let state = AppState { catalog };

    Ok(Router::new()
        .route("/", get(handle_root))
        .route("/items", get(handle_list_items).post(handle_add_item))
        .route("/items/{item_id}", get(handle_get_item))
        .route("/search", get(handle_search))
        .route("/categories", get(handle_categories))
        .route("/image/{image_filename}", get(handle_get_image))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

// ============ Responses ============

/// The envelope every message-style response uses.
#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let message = match &self {
            CatalogError::InvalidRequest(msg) | CatalogError::NotFound(msg) => msg.clone(),
            CatalogError::Read(msg) => format!("failed to read upload: {}", msg),
            CatalogError::Persistence(_) => "storage backend failure".to_string(),
            CatalogError::Json(_) => "item document is malformed".to_string(),
            CatalogError::Io(_) => "file system failure".to_string(),
        };

        if self.is_internal() {
            tracing::error!("request failed: {}", self);
        }

        (self.status(), Json(MessageResponse { message })).into_response()
    }
}

type ApiResult<T> = Result<T, CatalogError>;

// ============ GET / ============

async fn handle_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, world!".to_string(),
    })
}

// ============ POST /items ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemResponse {
    message: String,
    id: i64,
    image_details: ImageDetails,
}

#[derive(Serialize)]
struct ImageDetails {
    /// File name the client uploaded.
    name: String,
    /// Where the content-addressed copy was stored.
    path: String,
}

struct ItemForm {
    name: Option<String>,
    category: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

fn read_error(e: MultipartError) -> CatalogError {
    CatalogError::Read(e.body_text())
}

async fn read_item_form(mut multipart: Multipart) -> ApiResult<ItemForm> {
    let mut form = ItemForm {
        name: None,
        category: None,
        image: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => form.name = Some(field.text().await.map_err(read_error)?),
            Some("category") => form.category = Some(field.text().await.map_err(read_error)?),
            Some("image") => {
                // Only a file part counts as the upload.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = field.bytes().await.map_err(read_error)?;
                form.image = Some((file_name, data.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Handler for `POST /items`.
///
/// Returns `400` when a field or the image file is missing, `500` when the
/// image or the item cannot be persisted.
async fn handle_add_item(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AddItemResponse>> {
    let multipart = multipart.map_err(|e| CatalogError::invalid(e.body_text()))?;
    let form = read_item_form(multipart).await?;

    let name = form
        .name
        .ok_or_else(|| CatalogError::invalid("name is required"))?;
    let category = form
        .category
        .ok_or_else(|| CatalogError::invalid("category is required"))?;
    let (file_name, data) = form
        .image
        .ok_or_else(|| CatalogError::invalid("image file is required"))?;

    let added = state.catalog.add_item(&name, &category, &data).await?;

    Ok(Json(AddItemResponse {
        message: format!("item received: {}", added.name),
        id: added.id,
        image_details: ImageDetails {
            name: file_name,
            path: added.image.path.display().to_string(),
        },
    }))
}

// ============ GET /items ============

async fn handle_list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(state.catalog.list_items().await?))
}

// ============ GET /items/{item_id} ============

async fn handle_get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<Item>> {
    let id: i64 = item_id
        .parse()
        .map_err(|_| CatalogError::invalid(format!("invalid item id: {}", item_id)))?;
    Ok(Json(state.catalog.get_item(id).await?))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    keyword: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    items: Vec<SearchHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let keyword = params
        .keyword
        .ok_or_else(|| CatalogError::invalid("keyword is required"))?;
    let items = state.catalog.search(&keyword).await?;
    Ok(Json(SearchResponse { items }))
}

// ============ GET /categories ============

#[derive(Serialize)]
struct CategoriesResponse {
    categories: Vec<Category>,
}

async fn handle_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<CategoriesResponse>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

// ============ GET /image/{image_filename} ============

/// Handler for `GET /image/{image_filename}`.
///
/// Unknown names are served the placeholder image. Only when the
/// placeholder itself is missing does this return `404`.
async fn handle_get_image(
    State(state): State<AppState>,
    Path(image_filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.catalog.images().resolve(&image_filename).await?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::not_found(format!(
                "image not found: {}",
                image_filename
            )))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}
