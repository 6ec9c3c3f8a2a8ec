//! The catalog and ingestion engine: a SQLite record store, the pipeline
//! that turns source images into identity-keyed artifacts, and the map
//! marker view derived from it.

pub mod db;
pub mod delete;
pub mod error;
pub mod import;
pub mod library;
pub mod markers;
pub mod models;

#[cfg(test)]
mod test_helpers;

pub use db::Catalog;
pub use error::{CatalogError, Result};
pub use library::{Library, LibraryPaths};
pub use markers::{MapView, Marker, markers_for};
pub use models::{PhotoId, PhotoRecord};
pub use photomap_core::imaging::Rotation;
pub use photomap_metadata::Geotag;
