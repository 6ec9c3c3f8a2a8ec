//! Decoding of EXIF GPS coordinates into decimal degrees.
//!
//! EXIF stores each coordinate as three rationals (degrees, minutes,
//! seconds) plus a hemisphere letter in a sibling tag. A coordinate is only
//! usable when both halves are present, and a geotag is only produced when
//! both latitude and longitude are usable.

use std::path::Path;

use exif::{Exif, Field, In, Tag, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MetadataError;
use crate::exif::read_exif;

/// A decimal-degree location. Latitude and longitude always travel together.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geotag {
    pub latitude: f64,
    pub longitude: f64,
}

impl Geotag {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rebuild a geotag from two nullable columns. A lone half is dropped.
    pub fn from_pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn sign(self) -> f64 {
        match self {
            Self::North | Self::East => 1.0,
            Self::South | Self::West => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn value_tag(self) -> Tag {
        match self {
            Self::Latitude => Tag::GPSLatitude,
            Self::Longitude => Tag::GPSLongitude,
        }
    }

    fn ref_tag(self) -> Tag {
        match self {
            Self::Latitude => Tag::GPSLatitudeRef,
            Self::Longitude => Tag::GPSLongitudeRef,
        }
    }

    fn field_name(self) -> &'static str {
        match self {
            Self::Latitude => "GPSLatitude",
            Self::Longitude => "GPSLongitude",
        }
    }

    fn ref_name(self) -> &'static str {
        match self {
            Self::Latitude => "GPSLatitudeRef",
            Self::Longitude => "GPSLongitudeRef",
        }
    }

    fn hemisphere(self, letter: char) -> Option<Hemisphere> {
        match (self, letter.to_ascii_uppercase()) {
            (Self::Latitude, 'N') => Some(Hemisphere::North),
            (Self::Latitude, 'S') => Some(Hemisphere::South),
            (Self::Longitude, 'E') => Some(Hemisphere::East),
            (Self::Longitude, 'W') => Some(Hemisphere::West),
            _ => None,
        }
    }
}

/// `degrees + minutes/60 + seconds/3600`, negated in the southern and
/// western hemispheres.
pub fn dms_to_decimal(dms: [f64; 3], hemisphere: Hemisphere) -> f64 {
    let [degrees, minutes, seconds] = dms;
    hemisphere.sign() * (degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Read the geotag of an image file.
///
/// `Ok(None)` means the file carries no usable location: no EXIF block, or
/// a coordinate triple or hemisphere letter missing on either axis.
pub fn read_geotag(path: &Path) -> Result<Option<Geotag>, MetadataError> {
    match read_exif(path)? {
        Some(exif) => geotag_from_exif(&exif),
        None => Ok(None),
    }
}

/// Lenient variant of [`read_geotag`]: metadata that is present but
/// unusable degrades to absence and is only logged. Failing to read the
/// file at all is still an error.
pub fn extract_geotag(path: &Path) -> Result<Option<Geotag>, MetadataError> {
    match read_geotag(path) {
        Ok(Some(geotag)) => {
            debug!(?path, ?geotag, "geotag found");
            Ok(Some(geotag))
        }
        Ok(None) => {
            debug!(?path, "image has no coordinates");
            Ok(None)
        }
        Err(err) if err.is_parse() => {
            warn!(?path, %err, "ignoring unreadable geotag");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub fn geotag_from_exif(exif: &Exif) -> Result<Option<Geotag>, MetadataError> {
    let latitude = coordinate(exif, Axis::Latitude)?;
    let longitude = coordinate(exif, Axis::Longitude)?;
    Ok(Geotag::from_pair(latitude, longitude))
}

fn coordinate(exif: &Exif, axis: Axis) -> Result<Option<f64>, MetadataError> {
    let value = exif.get_field(axis.value_tag(), In::PRIMARY);
    let reference = exif.get_field(axis.ref_tag(), In::PRIMARY);
    let (Some(value), Some(reference)) = (value, reference) else {
        return Ok(None);
    };

    let dms = dms_triple(value, axis.field_name())?;
    let hemisphere = hemisphere(reference, axis)?;
    Ok(Some(dms_to_decimal(dms, hemisphere)))
}

fn dms_triple(field: &Field, name: &'static str) -> Result<[f64; 3], MetadataError> {
    let Value::Rational(ref parts) = field.value else {
        return Err(MetadataError::Parse {
            field: name,
            reason: format!("expected rationals, found {:?}", field.value),
        });
    };
    if parts.len() < 3 {
        return Err(MetadataError::Parse {
            field: name,
            reason: format!("expected 3 components, found {}", parts.len()),
        });
    }

    let dms = [parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64()];
    if dms.iter().any(|v| !v.is_finite()) {
        return Err(MetadataError::Parse {
            field: name,
            reason: "zero denominator".to_string(),
        });
    }
    Ok(dms)
}

fn hemisphere(field: &Field, axis: Axis) -> Result<Hemisphere, MetadataError> {
    let letter = match field.value {
        Value::Ascii(ref strings) => strings
            .first()
            .and_then(|s| s.first())
            .map(|&b| b as char),
        _ => None,
    };

    letter
        .and_then(|l| axis.hemisphere(l))
        .ok_or_else(|| MetadataError::Parse {
            field: axis.ref_name(),
            reason: format!("unexpected hemisphere {}", field.display_value()),
        })
}
