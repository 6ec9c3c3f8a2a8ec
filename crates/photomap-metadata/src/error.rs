use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading embedded image metadata.
///
/// `Parse` and most of `Malformed` make up the "metadata present but
/// unusable" class, see [`MetadataError::is_parse`].
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to open {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable EXIF block in {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },

    #[error("malformed {field}: {reason}")]
    Parse { field: &'static str, reason: String },
}

impl MetadataError {
    /// True for errors caused by the metadata content rather than by I/O.
    /// A container that ends early is content, a failing read is not.
    pub fn is_parse(&self) -> bool {
        match self {
            Self::Io { .. } => false,
            Self::Malformed {
                source: exif::Error::Io(err),
                ..
            } => err.kind() == std::io::ErrorKind::UnexpectedEof,
            Self::Malformed { .. } | Self::Parse { .. } => true,
        }
    }
}
