use std::fs;

use tracing::{info, warn};

use crate::db::Catalog;
use crate::error::{CatalogError, Result};
use crate::models::PhotoId;

#[derive(Debug)]
pub struct DeleteFailure {
    pub id: PhotoId,
    pub error: CatalogError,
}

#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<PhotoId>,
    pub failures: Vec<DeleteFailure>,
}

/// Remove a photo: full image, then thumbnail, then the record.
///
/// Files go first so an interruption leaves a visible record pointing at
/// missing files rather than files nobody references. If either removal
/// fails the record stays.
pub fn delete(catalog: &Catalog, id: PhotoId) -> Result<()> {
    let record = catalog.get(id)?;

    for path in [&record.full_image_path, &record.thumbnail_path] {
        fs::remove_file(path).map_err(|source| CatalogError::Deletion {
            id,
            path: path.clone(),
            source,
        })?;
    }

    catalog.delete(id)?;
    info!(id, "deleted photo");
    Ok(())
}

/// Delete each id in order, collecting successes and failures.
pub fn delete_many<I>(catalog: &Catalog, ids: I) -> DeleteReport
where
    I: IntoIterator<Item = PhotoId>,
{
    let mut report = DeleteReport::default();

    for id in ids {
        match delete(catalog, id) {
            Ok(()) => report.deleted.push(id),
            Err(err) => {
                warn!(id, %err, "failed to delete");
                report.failures.push(DeleteFailure { id, error: err });
            }
        }
    }

    info!(
        deleted = report.deleted.len(),
        failed = report.failures.len(),
        "delete complete"
    );
    report
}
