use std::path::Path;

use anyhow::Result;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use photomap_core::imaging::{
    Rotation, apply_orientation, encode_image, load_image, save_image, write_encoded,
};
use photomap_metadata::exif::read_orientation;

use crate::store::ArtifactPaths;

/// Thumbnails are square; the source aspect ratio is not preserved.
pub const THUMBNAIL_SIZE: u32 = 100;

/// Scale an image to the fixed thumbnail square.
pub fn generate_thumbnail(img: &DynamicImage) -> DynamicImage {
    img.resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
}

/// Write the upright full-size copy and the thumbnail of `source`.
///
/// Orientation is read from the source's EXIF block and baked into the
/// pixels, since the re-encoded artifacts carry no metadata.
pub fn derive_artifacts(source: &Path, paths: &ArtifactPaths) -> Result<()> {
    let (img, format) = load_image(source)?;

    let orientation = read_orientation(source).unwrap_or_else(|err| {
        debug!(?source, %err, "no usable orientation, keeping pixels as stored");
        None
    });
    let upright = match orientation {
        Some(orientation) => apply_orientation(img, orientation),
        None => img,
    };

    save_image(&upright, &paths.full_image, format)?;
    write_thumbnail(&upright, &paths.thumbnail, format)?;

    info!(?source, ?orientation, full = ?paths.full_image, "derived artifacts");
    Ok(())
}

/// Rotate a stored full-size artifact in place and regenerate its thumbnail.
///
/// Both files are encoded before either is replaced, and the full image is
/// written last: a failure leaves the full image as it was.
pub fn rotate_artifacts(paths: &ArtifactPaths, rotation: Rotation) -> Result<()> {
    let (img, format) = load_image(&paths.full_image)?;
    let rotated = rotation.apply(&img);

    let full = encode_image(&rotated, format)?;
    let thumb = encode_image(&generate_thumbnail(&rotated), format)?;
    write_encoded(&thumb, &paths.thumbnail)?;
    write_encoded(&full, &paths.full_image)?;

    debug!(full = ?paths.full_image, ?rotation, "rotated artifacts");
    Ok(())
}

fn write_thumbnail(img: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    let thumb = generate_thumbnail(img);
    save_image(&thumb, path, format)
}
