use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// The two derived files of one photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub full_image: PathBuf,
    pub thumbnail: PathBuf,
}

impl ArtifactPaths {
    /// Best-effort removal used when an ingestion is rolled back. Files that
    /// were never written are not an error.
    pub fn discard(&self) {
        for path in [&self.full_image, &self.thumbnail] {
            match fs::remove_file(path) {
                Ok(()) => debug!(?path, "discarded artifact"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(?path, %err, "failed to discard artifact"),
            }
        }
    }
}

/// Sibling directories holding full-size artifacts and thumbnails, both
/// named by photo id plus the source's extension.
pub struct ArtifactStore {
    images_dir: PathBuf,
    icons_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(images_dir: PathBuf, icons_dir: PathBuf) -> Result<Self> {
        for dir in [&images_dir, &icons_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("create artifact dir: {}", dir.display()))?;
        }
        Ok(Self {
            images_dir,
            icons_dir,
        })
    }

    /// Where the artifacts of photo `id` derived from `source` live.
    pub fn paths_for(&self, id: i64, source: &Path) -> ArtifactPaths {
        let name = artifact_name(id, source);
        ArtifactPaths {
            full_image: self.images_dir.join(&name),
            thumbnail: self.icons_dir.join(&name),
        }
    }

    /// Remove every artifact belonging to one of `ids`, whatever its
    /// extension. Used for ids whose ingestion never finalized. Returns how
    /// many files were removed.
    pub fn discard_ids(&self, ids: &[i64]) -> usize {
        let mut removed = 0;
        for dir in [&self.images_dir, &self.icons_dir] {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(?dir, %err, "cannot scan artifact dir");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(id) = artifact_id(&path) else {
                    continue;
                };
                if !ids.contains(&id) {
                    continue;
                }
                match fs::remove_file(&path) {
                    Ok(()) => {
                        debug!(?path, "removed orphaned artifact");
                        removed += 1;
                    }
                    Err(err) => warn!(?path, %err, "failed to remove orphaned artifact"),
                }
            }
        }
        removed
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn icons_dir(&self) -> &Path {
        &self.icons_dir
    }
}

/// `<id>.<ext>` with the source extension's case preserved, or just `<id>`
/// when the source has no extension.
pub fn artifact_name(id: i64, source: &Path) -> OsString {
    let mut name = OsString::from(id.to_string());
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// The photo id an artifact file is named after.
fn artifact_id(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}
