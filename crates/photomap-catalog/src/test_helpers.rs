//! Shared setup for the catalog test suites: a throwaway library directory
//! and source images generated on the fly.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use photomap_metadata::fixture::ExifFixture;
use photomap_thumbnails::ArtifactStore;

use crate::db::Catalog;
use crate::library::{Library, LibraryPaths};

pub struct Setup {
    pub dir: TempDir,
    pub catalog: Catalog,
    pub artifacts: ArtifactStore,
}

pub fn setup() -> Setup {
    let dir = TempDir::new().unwrap();
    let paths = LibraryPaths::in_dir(&dir.path().join("library"));
    std::fs::create_dir_all(dir.path().join("library")).unwrap();
    let catalog = Catalog::open(&paths.database).unwrap();
    let artifacts = ArtifactStore::new(paths.images_dir, paths.icons_dir).unwrap();
    Setup {
        dir,
        catalog,
        artifacts,
    }
}

pub fn library() -> (TempDir, Library) {
    let dir = TempDir::new().unwrap();
    let library = Library::open(&LibraryPaths::in_dir(&dir.path().join("library"))).unwrap();
    (dir, library)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 80, 40])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

/// A 48x32 JPEG named `name` inside `dir`, optionally geotagged.
pub fn write_photo(dir: &Path, name: &str, gps: Option<ExifFixture>) -> PathBuf {
    let path = dir.join(name);
    let bytes = match gps {
        Some(fixture) => fixture.apply_to_jpeg(&jpeg_bytes(48, 32)),
        None => jpeg_bytes(48, 32),
    };
    std::fs::write(&path, bytes).unwrap();
    path
}

/// 40°26'46"N 79°58'56"W
pub fn pittsburgh() -> ExifFixture {
    ExifFixture::new()
        .latitude('N', [40, 26, 46])
        .longitude('W', [79, 58, 56])
}

/// 33°51'54"S 151°12'36"E
pub fn sydney() -> ExifFixture {
    ExifFixture::new()
        .latitude('S', [33, 51, 54])
        .longitude('E', [151, 12, 36])
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
