//! # rr-feed-reddit
//!
//! `FeedSource` over Reddit's public listing JSON
//! (`{base}/r/{board}/{sort}.json`). Anonymous access only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rr_core::models::{FeedPage, FeedPost, Sort};
use rr_core::traits::FeedSource;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub struct RedditFeed {
    client: reqwest::Client,
    base_url: Url,
}

impl RedditFeed {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;
        let base_url = Url::parse(base_url)?;
        Ok(Self { client, base_url })
    }

    fn listing_url(&self, board: &str, sort: Sort, limit: u32, after: Option<&str>) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("{} cannot be a base url", self.base_url))?
            .pop_if_empty()
            .push("r")
            .push(board)
            .push(&format!("{sort}.json"));
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.to_string());
            query.append_pair("raw_json", "1");
            if let Some(after) = after {
                query.append_pair("after", after);
            }
        }
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    over_18: bool,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    post_hint: Option<String>,
}

impl From<PostData> for FeedPost {
    fn from(post: PostData) -> Self {
        let created_at = DateTime::from_timestamp(post.created_utc as i64, 0).unwrap_or_else(Utc::now);
        FeedPost {
            title: post.title,
            url: post.url,
            over_18: post.over_18,
            created_at,
            hint: post.post_hint,
        }
    }
}

#[async_trait]
impl FeedSource for RedditFeed {
    async fn fetch_page(
        &self,
        board: &str,
        sort: Sort,
        limit: u32,
        after: Option<String>,
    ) -> anyhow::Result<FeedPage> {
        let url = self.listing_url(board, sort, limit, after.as_deref())?;
        log::debug!("fetching {url}");

        let listing: Listing = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(FeedPage {
            posts: listing.data.children.into_iter().map(|c| c.data.into()).collect(),
            after: listing.data.after,
        })
    }

    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
