use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

pub fn is_supported_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// A quarter turn applied to an already upright image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Rotate the whole canvas, so a landscape image becomes portrait
    /// instead of being cropped.
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Self::Clockwise => image.rotate90(),
            Self::CounterClockwise => image.rotate270(),
        }
    }
}

/// Decode an image, detecting its format from content rather than from
/// the file name.
pub fn load_image(path: &Path) -> Result<(DynamicImage, ImageFormat)> {
    let t0 = std::time::Instant::now();

    let reader = ImageReader::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read image: {}", path.display()))?;
    let format = reader
        .format()
        .with_context(|| format!("unrecognized image format: {}", path.display()))?;
    let img = reader
        .decode()
        .with_context(|| format!("failed to decode image: {}", path.display()))?;

    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        ?format,
        width = img.width(),
        height = img.height(),
        "image decode"
    );
    Ok((img, format))
}

/// Undo an EXIF orientation (1..=8) so the pixels are stored upright.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Encode `image` in `format`. JPEG has no alpha channel and no 16-bit
/// samples, so anything else is flattened to RGB8 first.
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let flattened;
    let image = match (format, image.color()) {
        (ImageFormat::Jpeg, ColorType::L8 | ColorType::Rgb8) => image,
        (ImageFormat::Jpeg, _) => {
            flattened = DynamicImage::ImageRgb8(image.to_rgb8());
            &flattened
        }
        _ => image,
    };

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .with_context(|| format!("failed to encode {format:?}"))?;
    Ok(bytes)
}

pub fn save_image(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    let bytes = encode_image(image, format)?;
    write_encoded(&bytes, path)?;
    debug!(?path, ?format, "image written");
    Ok(())
}

pub fn write_encoded(bytes: &[u8], path: &Path) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
