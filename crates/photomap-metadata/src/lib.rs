pub mod error;
pub mod exif;
pub mod gps;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use error::MetadataError;
pub use gps::Geotag;
