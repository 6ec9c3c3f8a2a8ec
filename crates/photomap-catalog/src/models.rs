use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use photomap_metadata::Geotag;
use photomap_thumbnails::ArtifactPaths;

pub type PhotoId = i64;

/// One finalized catalog entry. Placeholders reserved during ingestion are
/// never handed out as records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub full_image_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub geotag: Option<Geotag>,
}

impl PhotoRecord {
    pub fn latitude(&self) -> Option<f64> {
        self.geotag.map(|g| g.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.geotag.map(|g| g.longitude)
    }

    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths {
            full_image: self.full_image_path.clone(),
            thumbnail: self.thumbnail_path.clone(),
        }
    }
}
