pub mod generator;
pub mod store;

pub use generator::{THUMBNAIL_SIZE, derive_artifacts, rotate_artifacts};
pub use store::{ArtifactPaths, ArtifactStore};
