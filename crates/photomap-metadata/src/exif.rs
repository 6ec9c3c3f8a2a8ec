use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Tag};
use tracing::debug;

use crate::error::MetadataError;

/// Read the EXIF block of an image container.
///
/// Returns `Ok(None)` when the container is readable but carries no EXIF
/// data at all, which is the common case for screenshots and exported PNGs.
pub fn read_exif(path: &Path) -> Result<Option<Exif>, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => {
            debug!(?path, "no EXIF block");
            Ok(None)
        }
        Err(source) => Err(MetadataError::Malformed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// The EXIF orientation (1..=8) of an image, if it declares a valid one.
pub fn read_orientation(path: &Path) -> Result<Option<u32>, MetadataError> {
    Ok(read_exif(path)?.and_then(|exif| orientation(&exif)))
}

pub fn orientation(exif: &Exif) -> Option<u32> {
    get_u32(exif, Tag::Orientation).filter(|o| (1..=8).contains(o))
}

fn get_u32(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY).and_then(|f| match f.value {
        exif::Value::Short(ref v) => v.first().map(|&x| x as u32),
        exif::Value::Long(ref v) => v.first().copied(),
        _ => f.display_value().to_string().trim().parse().ok(),
    })
}
