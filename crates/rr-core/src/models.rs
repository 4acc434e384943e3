//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Reader.
//! Ids are assigned by the store; an entity that has not been persisted yet
//! carries `id: None` unless the submitted form supplied one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A content source (e.g., reddit.com) and the format its feed is extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: Option<i32>,
    pub name: String,
    pub url: String,
    pub extraction_type: String,
}

/// A named sub-source under a Host (e.g., one subreddit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: Option<i32>,
    pub name: String,
    pub url: String,
    pub host: Host,
}

/// Metadata for one downloaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Option<i32>,
    pub title: String,
    pub url: String,
    pub local_path: String,
    pub date: DateTime<Utc>,
    pub board: Board,
}

/// Feed formats offered when registering a Host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionType {
    Json,
    Html,
    Xml,
}

impl ExtractionType {
    pub const ALL: [ExtractionType; 3] = [ExtractionType::Json, ExtractionType::Html, ExtractionType::Xml];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionType::Json => "json",
            ExtractionType::Html => "html",
            ExtractionType::Xml => "xml",
        }
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking used when listing a board's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    Best,
    Hot,
    New,
    Top,
    Rising,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Best => "best",
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Rising => "rising",
        }
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(Sort::Best),
            "hot" => Ok(Sort::Hot),
            "new" => Ok(Sort::New),
            "top" => Ok(Sort::Top),
            "rising" => Ok(Sort::Rising),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// One post of a scraped feed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub title: String,
    pub url: String,
    pub over_18: bool,
    pub created_at: DateTime<Utc>,
    /// Provider hint about the post kind ("image", "link", ...)
    pub hint: Option<String>,
}

impl FeedPost {
    pub fn is_image(&self) -> bool {
        if self.hint.as_deref() == Some("image") {
            return true;
        }
        let path = self.url.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }

    /// Safe-for-work image posts are the only ones ingested.
    pub fn is_sfw_image(&self) -> bool {
        self.is_image() && !self.over_18
    }
}

/// A page of posts plus the cursor for the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub after: Option<String>,
}
