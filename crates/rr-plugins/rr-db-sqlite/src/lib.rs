//! # rr-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `rr-core` domain models. Referenced rows are loaded with joins, so
//! a board always carries its host and an image its board.

mod board;
mod host;
mod image;

pub use board::SqliteBoardRepo;
pub use host::SqliteHostRepo;
pub use image::SqliteImageRepo;

use rr_core::error::AppError;
use rr_core::models::{Board, Host};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteQueryResult, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Owns the connection pool and hands out the per-entity repositories.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url` (e.g. `sqlite:rusty_reader.db` or `sqlite::memory:`)
    /// and brings the schema up to date.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives exactly as long as its single connection.
        let in_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        MIGRATOR.run(&pool).await?;
        log::info!("connected to {url}");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn hosts(&self) -> SqliteHostRepo {
        SqliteHostRepo::new(self.pool.clone())
    }

    pub fn boards(&self) -> SqliteBoardRepo {
        SqliteBoardRepo::new(self.pool.clone())
    }

    pub fn images(&self) -> SqliteImageRepo {
        SqliteImageRepo::new(self.pool.clone())
    }
}

const HOST_COLUMNS: &str =
    "h.id AS host_id, h.name AS host_name, h.url AS host_url, h.extraction_type AS host_extraction_type";

const BOARD_COLUMNS: &str = "b.id AS board_id, b.name AS board_name, b.url AS board_url";

fn host_from_row(row: &SqliteRow) -> sqlx::Result<Host> {
    Ok(Host {
        id: Some(row.try_get("host_id")?),
        name: row.try_get("host_name")?,
        url: row.try_get("host_url")?,
        extraction_type: row.try_get("host_extraction_type")?,
    })
}

fn board_from_row(row: &SqliteRow) -> sqlx::Result<Board> {
    Ok(Board {
        id: Some(row.try_get("board_id")?),
        name: row.try_get("board_name")?,
        url: row.try_get("board_url")?,
        host: host_from_row(row)?,
    })
}

/// Turns a unique-constraint violation into a `Conflict` the logic layer can
/// report. A clash on `{table}.id` names the submitted id, anything else
/// gets the message from `conflict`.
fn insert_error(err: sqlx::Error, table: &str, id: Option<i32>, conflict: impl FnOnce() -> String) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            // SQLite reports e.g. "UNIQUE constraint failed: host.id".
            let on_primary_key = db.message().ends_with(&format!(" {table}.id"));
            return match id {
                Some(id) if on_primary_key => AppError::Conflict(format!("ID: \"{id}\" already exists")).into(),
                _ => AppError::Conflict(conflict()).into(),
            };
        }
    }
    err.into()
}

/// Rowid of the row just inserted. Ids are `i32` throughout the domain.
fn inserted_id(result: &SqliteQueryResult) -> anyhow::Result<i32> {
    let rowid = result.last_insert_rowid();
    i32::try_from(rowid).map_err(|_| anyhow::anyhow!("rowid {rowid} does not fit an id"))
}

fn persisted_id(id: Option<i32>, what: &str) -> anyhow::Result<i32> {
    id.ok_or_else(|| anyhow::anyhow!("{what} has not been stored yet"))
}
