use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use photomap_metadata::Geotag;
use photomap_thumbnails::THUMBNAIL_SIZE;

use crate::models::{PhotoId, PhotoRecord};

/// Where a freshly opened map looks before the user pans anywhere.
pub const DEFAULT_CENTER: Geotag = Geotag {
    latitude: 55.7529,
    longitude: 37.622107,
};
pub const DEFAULT_ZOOM: u8 = 10;

/// A map pin drawn with the photo's thumbnail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub photo_id: PhotoId,
    pub icon_path: PathBuf,
    pub latitude: f64,
    pub longitude: f64,
}

/// Markers for every located record, in catalog order.
///
/// Always a full rebuild; callers run it again after each mutation.
pub fn markers_for(records: &[PhotoRecord]) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|record| {
            let geotag = record.geotag?;
            Some(Marker {
                photo_id: record.id,
                icon_path: record.thumbnail_path.clone(),
                latitude: geotag.latitude,
                longitude: geotag.longitude,
            })
        })
        .collect()
}

/// Everything an external map renderer needs to draw the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Geotag,
    pub zoom: u8,
    pub icon_size: [u32; 2],
    pub markers: Vec<Marker>,
}

impl MapView {
    pub fn new(center: Geotag, zoom: u8, markers: Vec<Marker>) -> Self {
        Self {
            center,
            zoom,
            icon_size: [THUMBNAIL_SIZE, THUMBNAIL_SIZE],
            markers,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
