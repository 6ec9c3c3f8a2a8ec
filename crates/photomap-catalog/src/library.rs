use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use photomap_core::imaging::Rotation;
use photomap_metadata::Geotag;
use photomap_thumbnails::{ArtifactStore, rotate_artifacts};

use crate::db::Catalog;
use crate::delete::{self, DeleteReport};
use crate::error::{CatalogError, Result};
use crate::import::{self, IngestReport};
use crate::markers::{MapView, Marker, markers_for};
use crate::models::{PhotoId, PhotoRecord};

/// On-disk layout of a library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryPaths {
    pub database: PathBuf,
    pub images_dir: PathBuf,
    pub icons_dir: PathBuf,
}

impl LibraryPaths {
    pub fn in_dir(root: &Path) -> Self {
        Self {
            database: root.join("images_db.sqlite"),
            images_dir: root.join("images"),
            icons_dir: root.join("icons"),
        }
    }
}

/// The catalog together with its artifact directories: the whole engine
/// surface the presentation layer talks to.
///
/// Every call is synchronous and may take a while (decoding, resizing,
/// disk I/O). A `Library` is single-owner; see [`Catalog`] for the
/// threading rules.
pub struct Library {
    catalog: Catalog,
    artifacts: ArtifactStore,
}

impl Library {
    pub fn open(paths: &LibraryPaths) -> anyhow::Result<Self> {
        if let Some(parent) = paths.database.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create library dir: {}", parent.display()))?;
        }
        let catalog = Catalog::open(&paths.database)
            .with_context(|| format!("open catalog: {}", paths.database.display()))?;
        let artifacts = ArtifactStore::new(paths.images_dir.clone(), paths.icons_dir.clone())?;

        let stale = catalog
            .purge_placeholders()
            .context("purge stale placeholders")?;
        if !stale.is_empty() {
            artifacts.discard_ids(&stale);
        }

        info!(database = ?paths.database, "library opened");
        Ok(Self { catalog, artifacts })
    }

    pub fn ingest(&self, source: &Path) -> Result<PhotoRecord> {
        import::ingest(&self.catalog, &self.artifacts, source)
    }

    pub fn ingest_files<I, P>(&self, paths: I) -> IngestReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        import::ingest_files(&self.catalog, &self.artifacts, paths)
    }

    pub fn import_folder(&self, folder: &Path) -> Result<IngestReport> {
        import::import_folder(&self.catalog, &self.artifacts, folder)
    }

    pub fn delete(&self, id: PhotoId) -> Result<()> {
        delete::delete(&self.catalog, id)
    }

    pub fn delete_many<I>(&self, ids: I) -> DeleteReport
    where
        I: IntoIterator<Item = PhotoId>,
    {
        delete::delete_many(&self.catalog, ids)
    }

    pub fn get(&self, id: PhotoId) -> Result<PhotoRecord> {
        self.catalog.get(id)
    }

    pub fn list(&self) -> Result<Vec<PhotoRecord>> {
        self.catalog.list()
    }

    /// Forget every record. Artifact files stay where they are.
    pub fn clear(&self) -> Result<()> {
        self.catalog.clear()?;
        Ok(())
    }

    /// Turn a photo a quarter turn and rebuild its thumbnail. The record
    /// itself does not change.
    pub fn rotate(&self, id: PhotoId, rotation: Rotation) -> Result<PhotoRecord> {
        let record = self.catalog.get(id)?;
        rotate_artifacts(&record.artifacts(), rotation)
            .map_err(|source| CatalogError::Rotation { id, source })?;
        info!(id, ?rotation, "rotated photo");
        Ok(record)
    }

    pub fn markers(&self) -> Result<Vec<Marker>> {
        Ok(markers_for(&self.list()?))
    }

    pub fn map_view(&self, center: Geotag, zoom: u8) -> Result<MapView> {
        Ok(MapView::new(center, zoom, self.markers()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use photomap_core::imaging::load_image;

    #[test]
    fn layout_in_dir() {
        let paths = LibraryPaths::in_dir(Path::new("/data/photomap"));
        assert_eq!(paths.database, PathBuf::from("/data/photomap/images_db.sqlite"));
        assert_eq!(paths.images_dir, PathBuf::from("/data/photomap/images"));
        assert_eq!(paths.icons_dir, PathBuf::from("/data/photomap/icons"));
    }

    #[test]
    fn open_creates_layout() {
        let (dir, library) = library();
        let root = dir.path().join("library");
        assert!(root.join("images_db.sqlite").is_file());
        assert!(root.join("images").is_dir());
        assert!(root.join("icons").is_dir());
        assert!(library.list().unwrap().is_empty());
    }

    #[test]
    fn two_of_three_photos_become_markers() {
        let (dir, library) = library();
        let first = write_photo(dir.path(), "first.jpg", Some(pittsburgh()));
        let second = write_photo(dir.path(), "second.jpg", None);
        let third = write_photo(dir.path(), "third.jpg", Some(sydney()));

        let report = library.ingest_files([&first, &second, &third]);
        assert!(report.failures.is_empty());

        let markers = markers_for(&library.list().unwrap());
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].photo_id, report.ingested[0].id);
        assert_eq!(markers[1].photo_id, report.ingested[2].id);
        assert_eq!(markers[0].icon_path, report.ingested[0].thumbnail_path);
        assert!(approx(markers[0].latitude, 40.446111));
        assert!(approx(markers[1].latitude, -33.865));
        assert_eq!(library.markers().unwrap(), markers);
    }

    #[test]
    fn markers_follow_deletion() {
        let (dir, library) = library();
        let a = library
            .ingest(&write_photo(dir.path(), "a.jpg", Some(pittsburgh())))
            .unwrap();
        let b = library
            .ingest(&write_photo(dir.path(), "b.jpg", Some(sydney())))
            .unwrap();

        library.delete(a.id).unwrap();

        let ids: Vec<_> = library.markers().unwrap().iter().map(|m| m.photo_id).collect();
        assert_eq!(ids, vec![b.id]);
    }

    #[test]
    fn clear_keeps_artifacts() {
        let (dir, library) = library();
        let record = library
            .ingest(&write_photo(dir.path(), "a.jpg", None))
            .unwrap();

        library.clear().unwrap();

        assert!(library.list().unwrap().is_empty());
        assert!(matches!(library.get(record.id), Err(CatalogError::NotFound(_))));
        assert!(record.full_image_path.exists());
        assert!(record.thumbnail_path.exists());
    }

    #[test]
    fn ids_keep_growing_across_deletes() {
        let (dir, library) = library();
        let a = library
            .ingest(&write_photo(dir.path(), "a.jpg", None))
            .unwrap();
        library.delete(a.id).unwrap();
        let b = library
            .ingest(&write_photo(dir.path(), "b.jpg", None))
            .unwrap();
        assert!(b.id > a.id);
        assert_ne!(a.full_image_path, b.full_image_path);
    }

    #[test]
    fn rotate_rewrites_artifacts() {
        let (dir, library) = library();
        let record = library
            .ingest(&write_photo(dir.path(), "wide.jpg", None))
            .unwrap();

        let rotated = library.rotate(record.id, Rotation::Clockwise).unwrap();

        assert_eq!(rotated, record);
        let (full, _) = load_image(&record.full_image_path).unwrap();
        assert_eq!((full.width(), full.height()), (32, 48));
        let (thumb, _) = load_image(&record.thumbnail_path).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (100, 100));
    }

    #[test]
    fn rotate_unknown_is_not_found() {
        let (_dir, library) = library();
        let result = library.rotate(5, Rotation::CounterClockwise);
        assert!(matches!(result, Err(CatalogError::NotFound(5))));
    }

    #[test]
    fn rotate_with_missing_artifact_fails() {
        let (dir, library) = library();
        let record = library
            .ingest(&write_photo(dir.path(), "a.jpg", None))
            .unwrap();
        fs::remove_file(&record.full_image_path).unwrap();

        let result = library.rotate(record.id, Rotation::Clockwise);
        assert!(matches!(result, Err(CatalogError::Rotation { .. })));
    }

    #[test]
    fn reopen_purges_stale_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LibraryPaths::in_dir(&dir.path().join("library"));

        let (kept, partial) = {
            let library = Library::open(&paths).unwrap();
            let kept = library
                .ingest(&write_photo(dir.path(), "a.jpg", None))
                .unwrap();
            // Simulate a crash between reserve and finalize, after the
            // full image was already written.
            let stale = library.catalog.reserve().unwrap();
            let partial = library.artifacts.paths_for(stale, Path::new("b.jpg"));
            fs::write(&partial.full_image, b"half written").unwrap();
            (kept, partial)
        };

        let library = Library::open(&paths).unwrap();
        assert_eq!(library.list().unwrap(), vec![kept.clone()]);
        assert!(!partial.full_image.exists());
        assert!(kept.full_image_path.exists());
        assert!(kept.thumbnail_path.exists());
        assert!(library.catalog.purge_placeholders().unwrap().is_empty());
    }

    #[test]
    fn map_view_carries_markers() {
        let (dir, library) = library();
        library
            .ingest(&write_photo(dir.path(), "a.jpg", Some(sydney())))
            .unwrap();

        let view = library
            .map_view(crate::markers::DEFAULT_CENTER, crate::markers::DEFAULT_ZOOM)
            .unwrap();
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.icon_size, [100, 100]);
    }
}
