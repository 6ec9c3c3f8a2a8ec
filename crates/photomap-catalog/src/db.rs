use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info, warn};

use photomap_metadata::Geotag;
use photomap_thumbnails::ArtifactPaths;

use crate::error::{CatalogError, Result};
use crate::models::{PhotoId, PhotoRecord};

/// The persistent record store.
///
/// Rows whose `icon` is still NULL are placeholders: ids reserved by an
/// ingestion that has not finalized yet. They are invisible to `get` and
/// `list`.
///
/// A `Catalog` owns a single SQLite connection and is not `Sync`. Callers
/// that share one across threads must serialize `reserve`, `finalize`,
/// `delete` and `clear` themselves.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let catalog = Self { conn };
        catalog.migrate()?;
        Ok(catalog)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self { conn };
        catalog.migrate()?;
        Ok(catalog)
    }

    fn migrate(&self) -> Result<()> {
        info!("running catalog migrations");
        // AUTOINCREMENT keeps ids from being handed out again after the
        // highest row is deleted or the table is cleared.
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS images (
                id         INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                full_image TEXT,
                icon       TEXT,
                latitude   REAL,
                longitude  REAL,
                CHECK ((latitude IS NULL) = (longitude IS NULL))
            );
            ",
        )?;
        Ok(())
    }

    /// Allocate a fresh id backed by a placeholder row.
    pub fn reserve(&self) -> Result<PhotoId> {
        self.conn
            .execute("INSERT INTO images (full_image, icon) VALUES (NULL, NULL)", [])?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "reserved photo id");
        Ok(id)
    }

    /// Turn the placeholder `id` into a visible record.
    pub fn finalize(
        &self,
        id: PhotoId,
        paths: &ArtifactPaths,
        geotag: Option<Geotag>,
    ) -> Result<PhotoRecord> {
        let full_image = paths.full_image.to_string_lossy().into_owned();
        let icon = paths.thumbnail.to_string_lossy().into_owned();
        let updated = self.conn.execute(
            "UPDATE images
             SET full_image = ?1, icon = ?2, latitude = ?3, longitude = ?4
             WHERE id = ?5 AND icon IS NULL",
            params![
                full_image,
                icon,
                geotag.map(|g| g.latitude),
                geotag.map(|g| g.longitude),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(CatalogError::Integrity(format!(
                "photo {id} has no reserved placeholder"
            )));
        }

        Ok(PhotoRecord {
            id,
            full_image_path: full_image.into(),
            thumbnail_path: icon.into(),
            geotag,
        })
    }

    /// Drop the placeholder `id`. Returns false if there was none, which
    /// includes the case where `id` was already finalized.
    pub fn discard_placeholder(&self, id: PhotoId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM images WHERE id = ?1 AND icon IS NULL", params![id])?;
        Ok(removed > 0)
    }

    /// Drop every placeholder, e.g. those left behind by a process that
    /// died mid-ingestion, and return their ids.
    pub fn purge_placeholders(&self) -> Result<Vec<PhotoId>> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM images WHERE icon IS NULL RETURNING id")?;
        let mut ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<PhotoId>, _>>()?;
        ids.sort_unstable();
        if !ids.is_empty() {
            warn!(?ids, "purged stale placeholders");
        }
        Ok(ids)
    }

    pub fn get(&self, id: PhotoId) -> Result<PhotoRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, full_image, icon, latitude, longitude
             FROM images WHERE id = ?1 AND icon IS NOT NULL",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_record)?;
        rows.next()
            .transpose()?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Every finalized record in insertion order.
    pub fn list(&self) -> Result<Vec<PhotoRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, full_image, icon, latitude, longitude
             FROM images WHERE icon IS NOT NULL ORDER BY id ASC",
        )?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Remove a finalized record. Its artifacts are the caller's business.
    pub fn delete(&self, id: PhotoId) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM images WHERE id = ?1 AND icon IS NOT NULL",
            params![id],
        )?;
        if removed == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    /// Remove every row. Artifact files are left on disk.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM images", [])?;
        info!(removed, "catalog cleared");
        Ok(removed)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PhotoRecord> {
    let full_image: String = row.get(1)?;
    let icon: String = row.get(2)?;
    Ok(PhotoRecord {
        id: row.get(0)?,
        full_image_path: full_image.into(),
        thumbnail_path: icon.into(),
        geotag: Geotag::from_pair(row.get(3)?, row.get(4)?),
    })
}
