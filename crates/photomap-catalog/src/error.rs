use std::path::PathBuf;

use thiserror::Error;

use crate::models::PhotoId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("source image {} is missing or unreadable", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store no longer matches what the caller reserved. This is a bug,
    /// not a transient condition.
    #[error("catalog integrity violated: {0}")]
    Integrity(String),

    #[error("failed to ingest {}", path.display())]
    Ingestion {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to remove artifact {} of photo {id}", path.display())]
    Deletion {
        id: PhotoId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rotate photo {id}")]
    Rotation {
        id: PhotoId,
        #[source]
        source: anyhow::Error,
    },

    #[error("photo {0} not found")]
    NotFound(PhotoId),

    #[error("catalog database error")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
