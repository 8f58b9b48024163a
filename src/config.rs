use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[server].front_url`.
pub const FRONT_URL_ENV: &str = "FRONT_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DbConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Falls back to a per-backend default when omitted.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DbConfig {
    pub fn resolved_path(&self) -> PathBuf {
        match (&self.path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, Backend::Sqlite) => PathBuf::from("./db/mercari.sqlite3"),
            (None, Backend::Json) => PathBuf::from("./db/items.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_image")]
    pub default_image: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            default_image: default_image(),
        }
    }
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("./images")
}
fn default_image() -> String {
    "default.jpg".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_front_url")]
    pub front_url: String,
    /// Largest request body accepted, in bytes. Bounds image uploads.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            front_url: default_front_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:9000".to_string()
}
fn default_front_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Applies `FRONT_URL` on top of whatever the file said.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(FRONT_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.front_url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            bail!("server.bind must not be empty");
        }
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be greater than zero");
        }

        let default_image = &self.images.default_image;
        if !default_image.ends_with(".jpg")
            || Path::new(default_image).file_name().and_then(|n| n.to_str())
                != Some(default_image.as_str())
        {
            bail!(
                "images.default_image must be a bare .jpg file name, got '{}'",
                default_image
            );
        }

        axum::http::HeaderValue::from_str(&self.server.front_url).with_context(|| {
            format!(
                "server.front_url is not a valid origin: {}",
                self.server.front_url
            )
        })?;

        Ok(())
    }
}

/// Parses a config document without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Loads the config file at `path`, falling back to defaults when it does
/// not exist, then applies environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)?
    } else {
        tracing::warn!(
            "config file {} not found, using built-in defaults",
            path.display()
        );
        Config::minimal()
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}
