//! # rr-config
//!
//! Runtime settings for the Rusty-Reader binary. Values come from built-in
//! defaults overridden by `RR__`-prefixed environment variables
//! (e.g. `RR__SERVER__PORT=9000`, `RR__FEED__SORT=top`), after an optional
//! `.env` file has been loaded.

use config::{Config, Environment};
use rr_core::{IngestOptions, Sort};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub feed: FeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection url, e.g. `sqlite:rusty_reader.db`
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Directory downloaded images are written to
    pub root: PathBuf,
    /// Public URL prefix the images are delivered under
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    pub base_url: String,
    pub user_agent: String,
    pub sort: Sort,
    pub pages_per_board: u32,
    pub posts_per_page: u32,
    pub timeout_secs: u64,
}

impl FeedSettings {
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            sort: self.sort,
            pages_per_board: self.pages_per_board,
            posts_per_page: self.posts_per_page,
        }
    }
}

/// Loads `.env` into the process environment if one is found. Variables
/// already set are kept.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl Settings {
    /// Loads `.env` (if present) and the process environment on top of the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match load_dotenv() {
            Some(path) => log::debug!("loaded {}", path.display()),
            None => log::debug!("no .env file loaded"),
        }
        Self::from_environment(Environment::with_prefix("RR"))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:rusty_reader.db")?
            .set_default("media.root", "./data/images")?
            .set_default("media.url_prefix", "/ImageDelivery")?
            .set_default("feed.base_url", "https://www.reddit.com")?
            .set_default("feed.user_agent", concat!("rusty-reader/", env!("CARGO_PKG_VERSION")))?
            .set_default("feed.sort", "best")?
            .set_default("feed.pages_per_board", 1)?
            .set_default("feed.posts_per_page", 3)?
            .set_default("feed.timeout_secs", 30)?
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.pages_per_board == 0 {
            return Err(ConfigError::Invalid {
                key: "feed.pages_per_board",
                reason: "must be at least 1".into(),
            });
        }
        if !(1..=100).contains(&self.feed.posts_per_page) {
            return Err(ConfigError::Invalid {
                key: "feed.posts_per_page",
                reason: format!("{} is outside 1..=100", self.feed.posts_per_page),
            });
        }
        if !self.media.url_prefix.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "media.url_prefix",
                reason: "must start with '/'".into(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
