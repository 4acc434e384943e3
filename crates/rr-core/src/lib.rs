//! rusty-reader/crates/rr-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Reader.

pub mod error;
pub mod form;
pub mod ingest;
pub mod logic;
pub mod models;
pub mod registry;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use form::FormMap;
pub use ingest::{ImageIngestor, IngestOptions, IngestReport};
pub use logic::{BoardLogic, FieldValue, HostLogic, ImageLogic, Logic, TableSource};
pub use models::*;
pub use registry::{EntityKind, LogicRegistry};
pub use traits::*;
