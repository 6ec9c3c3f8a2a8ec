use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use photomap_metadata::gps::extract_geotag;
use photomap_metadata::{Geotag, MetadataError};
use photomap_thumbnails::{ArtifactPaths, ArtifactStore, derive_artifacts};

use crate::db::Catalog;
use crate::error::{CatalogError, Result};
use crate::models::{PhotoId, PhotoRecord};

#[derive(Debug)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub error: CatalogError,
}

/// Outcome of a multi-file add. One file failing never stops the others.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub ingested: Vec<PhotoRecord>,
    pub failures: Vec<IngestFailure>,
}

/// Turn one source image into a committed record.
///
/// The id is reserved first because it names the artifacts. Any failure
/// after the reservation removes the placeholder and whatever artifacts
/// were already written before the error is returned.
pub fn ingest(catalog: &Catalog, artifacts: &ArtifactStore, source: &Path) -> Result<PhotoRecord> {
    ingest_with(catalog, artifacts, source, extract_geotag)
}

fn ingest_with<F>(
    catalog: &Catalog,
    artifacts: &ArtifactStore,
    source: &Path,
    locate: F,
) -> Result<PhotoRecord>
where
    F: FnOnce(&Path) -> std::result::Result<Option<Geotag>, MetadataError>,
{
    check_source(source)?;

    let id = catalog.reserve()?;
    let paths = artifacts.paths_for(id, source);

    match commit(catalog, id, source, &paths, locate) {
        Ok(record) => {
            info!(
                id,
                ?source,
                located = record.geotag.is_some(),
                "ingested photo"
            );
            Ok(record)
        }
        Err(err) => {
            warn!(id, ?source, %err, "ingestion failed, rolling back");
            paths.discard();
            if let Err(rollback) = catalog.discard_placeholder(id) {
                error!(id, %rollback, "failed to roll back placeholder");
            }
            Err(err)
        }
    }
}

fn commit<F>(
    catalog: &Catalog,
    id: PhotoId,
    source: &Path,
    paths: &ArtifactPaths,
    locate: F,
) -> Result<PhotoRecord>
where
    F: FnOnce(&Path) -> std::result::Result<Option<Geotag>, MetadataError>,
{
    derive_artifacts(source, paths).map_err(|err| CatalogError::Ingestion {
        path: source.to_path_buf(),
        source: err,
    })?;

    // Read from the original: the re-encoded artifacts carry no EXIF.
    let geotag = locate(source).map_err(|err| CatalogError::Ingestion {
        path: source.to_path_buf(),
        source: anyhow::Error::new(err).context("read location metadata"),
    })?;

    catalog.finalize(id, paths, geotag)
}

fn check_source(source: &Path) -> Result<()> {
    let not_found = |err: io::Error| CatalogError::SourceNotFound {
        path: source.to_path_buf(),
        source: err,
    };

    let file = fs::File::open(source).map_err(not_found)?;
    let metadata = file.metadata().map_err(not_found)?;
    if !metadata.is_file() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(())
}

/// Ingest each path in order, collecting successes and failures.
pub fn ingest_files<I, P>(catalog: &Catalog, artifacts: &ArtifactStore, paths: I) -> IngestReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = IngestReport::default();

    for path in paths {
        let path = path.as_ref();
        match ingest(catalog, artifacts, path) {
            Ok(record) => report.ingested.push(record),
            Err(err) => {
                warn!(?path, %err, "failed to import");
                report.failures.push(IngestFailure {
                    path: path.to_path_buf(),
                    error: err,
                });
            }
        }
    }

    info!(
        ingested = report.ingested.len(),
        failed = report.failures.len(),
        "import complete"
    );
    report
}

/// Scan a folder (not recursively) for supported images and ingest them.
pub fn import_folder(
    catalog: &Catalog,
    artifacts: &ArtifactStore,
    folder: &Path,
) -> Result<IngestReport> {
    info!(?folder, "importing folder");

    let entries = fs::read_dir(folder).map_err(|err| CatalogError::SourceNotFound {
        path: folder.to_path_buf(),
        source: err,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(e) => e.path(),
            Err(err) => {
                warn!(?folder, %err, "readdir error");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if photomap_core::imaging::is_supported_extension(ext) {
            candidates.push(path);
        } else {
            debug!(?path, "skipping unsupported file");
        }
    }
    candidates.sort();

    Ok(ingest_files(catalog, artifacts, candidates))
}
