//! # Image Ingestion
//!
//! Walks every board's feed, downloads the safe-for-work images it has not
//! seen yet and registers them. Boards and posts are processed one after the
//! other; there is no retry. A failed post is recorded in the report and
//! skipped. A failed page fetch ends that board's walk.

use crate::error::{AppError, Result};
use crate::form::FormMap;
use crate::logic::{BoardLogic, ImageLogic, Logic};
use crate::models::{Board, FeedPost, Sort};
use crate::traits::{FeedSource, MediaStore};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub sort: Sort,
    pub pages_per_board: u32,
    pub posts_per_page: u32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            sort: Sort::Best,
            pages_per_board: 1,
            posts_per_page: 3,
        }
    }
}

/// Outcome of one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub boards: usize,
    pub added: usize,
    /// Posts skipped because their url is already registered.
    pub known: usize,
    /// Posts skipped because they are not images or are marked NSFW.
    pub filtered: usize,
    pub errors: Vec<String>,
}

pub struct ImageIngestor {
    feed: Arc<dyn FeedSource>,
    store: Arc<dyn MediaStore>,
    boards: Arc<BoardLogic>,
    images: Arc<ImageLogic>,
    options: IngestOptions,
}

impl ImageIngestor {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        store: Arc<dyn MediaStore>,
        boards: Arc<BoardLogic>,
        images: Arc<ImageLogic>,
        options: IngestOptions,
    ) -> Self {
        Self { feed, store, boards, images, options }
    }

    pub async fn run(&self) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for board in self.boards.get_all().await? {
            report.boards += 1;
            self.ingest_board(&board, &mut report).await?;
        }
        log::info!(
            "ingestion finished: {} boards, {} added, {} known, {} filtered, {} errors",
            report.boards,
            report.added,
            report.known,
            report.filtered,
            report.errors.len()
        );
        Ok(report)
    }

    async fn ingest_board(&self, board: &Board, report: &mut IngestReport) -> Result<()> {
        let mut after = None;
        for _ in 0..self.options.pages_per_board {
            let page = match self
                .feed
                .fetch_page(&board.name, self.options.sort, self.options.posts_per_page, after.take())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("unable to fetch feed for board {}: {e:#}", board.name);
                    report.errors.push(format!("{}: {e}", board.name));
                    return Ok(());
                }
            };

            for post in &page.posts {
                if !post.is_sfw_image() {
                    report.filtered += 1;
                    continue;
                }
                match self.ingest_post(board, post).await {
                    Ok(true) => report.added += 1,
                    Ok(false) => report.known += 1,
                    Err(e) => {
                        log::warn!("skipping {}: {e}", post.url);
                        report.errors.push(e.to_string());
                    }
                }
            }

            match page.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }
        Ok(())
    }

    /// Returns `Ok(false)` when the url was already registered.
    async fn ingest_post(&self, board: &Board, post: &FeedPost) -> Result<bool> {
        if self.images.get_image_with_url(&post.url).await?.is_some() {
            return Ok(false);
        }

        let file_name = file_name_from_url(&post.url)
            .ok_or_else(|| AppError::ValidationError(format!("no file name in url {}", post.url)))?;
        let data = self
            .feed
            .download(&post.url)
            .await
            .map_err(|e| AppError::Internal(format!("download of {} failed: {e}", post.url)))?;
        let local_path = self
            .store
            .save(&file_name, data)
            .await
            .map_err(|e| AppError::Internal(format!("unable to save {file_name}: {e:#}")))?;

        let board_id = board.id.map(|id| id.to_string()).unwrap_or_default();
        let mut form = FormMap::new();
        form.set(ImageLogic::TITLE, post.title.as_str());
        form.set(ImageLogic::URL, post.url.as_str());
        form.set(ImageLogic::BOARD_ID, board_id);
        form.set(ImageLogic::LOCAL_PATH, local_path);
        form.set(ImageLogic::DATE, self.images.convert_date(post.created_at));

        let image = self.images.register(&form).await?;
        log::debug!("stored image {:?} from {}", image.id, image.url);
        Ok(true)
    }
}

/// Last path segment of a url, e.g. `abc.jpg` for `https://i.redd.it/abc.jpg?x=1`.
///
/// Segments come back still percent-encoded, so every byte outside
/// `[A-Za-z0-9._-]` is replaced by `_`. The stored name then reads the same in
/// a delivery link and after the router decodes it.
pub fn file_name_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    let name: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    (!name.chars().all(|c| c == '.')).then_some(name)
}
