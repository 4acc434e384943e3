//! # rr-storage-local
//! rusty-reader/crates/rr-plugins/rr-storage-local/src/lib.rs
//! Local filesystem implementation of `MediaStore`.
//! Downloaded images are kept flat under the root, named after their source
//! file, each with a 250px WebP thumbnail next to it.

use async_trait::async_trait;
use image::ImageReader;
use rr_core::traits::MediaStore;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;

const THUMBNAIL_SIZE: u32 = 250;

pub struct LocalMediaStore {
    /// Root directory for all downloads (e.g., "./data/images")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/ImageDelivery")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    fn thumbnail_name(file_name: &str) -> String {
        format!("thumb_{file_name}.webp")
    }

    /// Resolves `file_name` under the root. Anything that is not a single
    /// plain path segment is refused.
    fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(file_name) {
            return None;
        }
        Some(self.root_path.join(file_name))
    }

    fn generate_thumbnail(data: &[u8], target: &Path) -> anyhow::Result<()> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let thumb = img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE);
        // The WebP encoder only takes 8-bit RGB(A).
        thumb.to_rgba8().save_with_format(target, image::ImageFormat::WebP)?;
        Ok(())
    }
}

/// A single path component: no separators and not `.` or `..`.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Writes the file and returns its path on disk. A file with the same
    /// name is overwritten.
    async fn save(&self, file_name: &str, data: Vec<u8>) -> anyhow::Result<String> {
        let target_path = self
            .resolve(file_name)
            .ok_or_else(|| anyhow::anyhow!("refusing to store {file_name:?}"))?;

        fs::create_dir_all(&self.root_path).await?;
        fs::write(&target_path, &data).await?;

        // A missing thumbnail only degrades the gallery.
        let thumb_path = self.root_path.join(Self::thumbnail_name(file_name));
        let result = tokio::task::spawn_blocking(move || Self::generate_thumbnail(&data, &thumb_path)).await?;
        if let Err(e) = result {
            log::warn!("no thumbnail for {file_name}: {e}");
        }

        Ok(target_path.to_string_lossy().into_owned())
    }

    async fn load(&self, file_name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(file_name) else {
            log::warn!("rejected media request for {file_name:?}");
            return Ok(None);
        };
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix, file_name)
    }

    async fn get_thumbnail_url(&self, file_name: &str) -> String {
        let thumb = Self::thumbnail_name(file_name);
        match fs::try_exists(self.root_path.join(&thumb)).await {
            Ok(true) => format!("{}/{}", self.url_prefix, thumb),
            _ => self.get_url(file_name).await,
        }
    }
}
