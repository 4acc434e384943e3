//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use crate::models::{Board, FeedPage, Host, Image, Sort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Data access for hosts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HostRepo: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<Host>>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Host>>;
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Host>>;
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<Host>>;
    async fn find_by_extraction_type(&self, extraction_type: &str) -> anyhow::Result<Vec<Host>>;

    /// Persists the host and returns it with its assigned id.
    async fn insert(&self, host: &Host) -> anyhow::Result<Host>;
    async fn delete(&self, id: i32) -> anyhow::Result<()>;
}

/// Data access for boards. Returned boards carry their owning host.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardRepo: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<Board>>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Board>>;
    async fn find_by_host_id(&self, host_id: i32) -> anyhow::Result<Vec<Board>>;
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<Board>>;
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Vec<Board>>;

    async fn insert(&self, board: &Board) -> anyhow::Result<Board>;
    async fn delete(&self, id: i32) -> anyhow::Result<()>;
}

/// Data access for images. Returned images carry their board and its host.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageRepo: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<Image>>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Image>>;
    async fn find_by_board_id(&self, board_id: i32) -> anyhow::Result<Vec<Image>>;
    async fn find_by_title(&self, title: &str) -> anyhow::Result<Vec<Image>>;
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<Image>>;
    async fn find_by_date(&self, date: DateTime<Utc>) -> anyhow::Result<Vec<Image>>;
    async fn find_by_local_path(&self, local_path: &str) -> anyhow::Result<Option<Image>>;

    async fn insert(&self, image: &Image) -> anyhow::Result<Image>;
    async fn delete(&self, id: i32) -> anyhow::Result<()>;
}

/// Media storage contract for downloaded images and their thumbnails.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes under `file_name` and returns the local path written.
    async fn save(&self, file_name: &str, data: Vec<u8>) -> anyhow::Result<String>;
    /// Reads a stored file back. `None` if it does not exist or the name is not a plain file name.
    async fn load(&self, file_name: &str) -> anyhow::Result<Option<Vec<u8>>>;
    /// Returns the URL to the original media.
    async fn get_url(&self, file_name: &str) -> String;
    /// Returns the URL to the thumbnail, or to the original when no thumbnail exists.
    async fn get_thumbnail_url(&self, file_name: &str) -> String;
}

/// The external image feed a board is scraped from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches one listing page of `board`, continuing after the `after` cursor.
    async fn fetch_page(
        &self,
        board: &str,
        sort: Sort,
        limit: u32,
        after: Option<String>,
    ) -> anyhow::Result<FeedPage>;

    /// Downloads the content behind a post url.
    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}
