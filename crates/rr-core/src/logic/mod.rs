//! # Logic Layer
//!
//! Per-entity services wrapping the repositories with validation, entity
//! construction from submitted forms, and the column metadata the generic
//! table views render from.

mod board;
mod host;
mod image;

pub use board::{BoardForm, BoardLogic};
pub use host::{HostForm, HostLogic};
pub use image::{ImageForm, ImageLogic, DATE_FORMAT};

use crate::error::{AppError, Result};
use crate::form::FormMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;

/// One cell of an entity row, in column order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Id(Option<i32>),
    Text(String),
    Date(DateTime<Utc>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Id(Some(id)) => write!(f, "{id}"),
            FieldValue::Id(None) => Ok(()),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Shared contract of the Host, Board and Image services.
///
/// `column_names`, `column_codes` and `extract_data_as_list` are index-aligned:
/// codes are the form keys, names their display labels.
#[async_trait]
pub trait Logic: Send + Sync {
    type Entity: Send + Sync;

    /// Display name of the entity, also its registry key.
    const ENTITY: &'static str;

    async fn get_all(&self) -> Result<Vec<Self::Entity>>;
    async fn get_with_id(&self, id: i32) -> Result<Option<Self::Entity>>;

    /// Builds a not-yet-persisted entity from a submitted form.
    async fn create_entity(&self, form: &FormMap) -> Result<Self::Entity>;

    async fn add(&self, entity: &Self::Entity) -> Result<Self::Entity>;
    async fn delete(&self, entity: &Self::Entity) -> Result<()>;

    fn column_names(&self) -> &'static [&'static str];
    fn column_codes(&self) -> &'static [&'static str];
    fn extract_data_as_list(&self, entity: &Self::Entity) -> Vec<FieldValue>;
}

/// Object-safe view of a logic service for the generic table pages.
#[async_trait]
pub trait TableSource: Send + Sync {
    fn caption(&self) -> &'static str;
    /// Header labels.
    fn headers(&self) -> &'static [&'static str];
    /// Form keys, aligned with `headers`.
    fn codes(&self) -> &'static [&'static str];
    async fn rows(&self) -> Result<Vec<Vec<FieldValue>>>;
}

#[async_trait]
impl<L: Logic> TableSource for L {
    fn caption(&self) -> &'static str {
        L::ENTITY
    }

    fn headers(&self) -> &'static [&'static str] {
        self.column_names()
    }

    fn codes(&self) -> &'static [&'static str] {
        self.column_codes()
    }

    async fn rows(&self) -> Result<Vec<Vec<FieldValue>>> {
        let entities = self.get_all().await?;
        Ok(entities.iter().map(|e| self.extract_data_as_list(e)).collect())
    }
}

/// Runs a repository call, translating its failure into an `AppError`.
///
/// Errors a repository raised as `AppError` (e.g. a unique-constraint
/// `Conflict`) keep their variant; anything else becomes `Internal`.
pub(crate) async fn get<T, F>(call: F) -> Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    call.await.map_err(translate)
}

pub(crate) fn translate(err: anyhow::Error) -> AppError {
    match err.downcast::<AppError>() {
        Ok(app) => app,
        Err(other) => {
            log::error!("repository failure: {other:#}");
            AppError::Internal(format!("{other:#}"))
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Board, Host, Image};
    use chrono::{TimeZone, Utc};

    pub fn host(id: i32) -> Host {
        Host {
            id: Some(id),
            name: format!("host-{id}"),
            url: "http://h".into(),
            extraction_type: "json".into(),
        }
    }

    pub fn board(id: i32, host_id: i32) -> Board {
        Board {
            id: Some(id),
            name: format!("board-{id}"),
            url: format!("https://www.reddit.com/r/board{id}"),
            host: host(host_id),
        }
    }

    pub fn image(id: i32, board_id: i32) -> Image {
        Image {
            id: Some(id),
            title: "JUnit".into(),
            url: format!("https://i.redd.it/{id}.jpg"),
            local_path: format!("/data/images/{id}.jpg"),
            date: Utc.timestamp_opt(0, 0).unwrap(),
            board: board(board_id, 1),
        }
    }
}
