mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use photomap_catalog::{Library, LibraryPaths, PhotoId, PhotoRecord, Rotation};
use photomap_core::layout::{GridPosition, columns_for_width, item_at, row_count};

use crate::config::{AppConfig, default_library_root};

#[derive(Parser)]
#[command(name = "photomap", version, about = "Keep a photo catalog and put it on a map")]
struct Cli {
    /// Library directory holding the catalog database, images and icons.
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add image files to the catalog.
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Add every supported image in a folder.
    Import { folder: PathBuf },
    /// Delete photos and their artifacts.
    Remove {
        #[arg(required = true)]
        ids: Vec<PhotoId>,
    },
    /// List every photo in catalog order.
    List,
    /// Show one photo.
    Show { id: PhotoId },
    /// Turn a photo a quarter turn clockwise.
    Rotate {
        id: PhotoId,
        /// Turn counter-clockwise instead.
        #[arg(long)]
        ccw: bool,
    },
    /// Print the gallery grid for a window of the given width.
    Grid {
        #[arg(long, default_value_t = 900)]
        width: u32,
    },
    /// Print the map view (center, zoom, markers) as JSON.
    Map,
    /// Forget every photo. Image files are kept on disk.
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli.library.unwrap_or_else(default_library_root);
    let config = AppConfig::load(&root)?;
    let library = Library::open(&LibraryPaths::in_dir(&root))?;
    info!(?root, "using library");

    match cli.command {
        Command::Add { files } => {
            let report = library.ingest_files(&files);
            for record in &report.ingested {
                println!("{}", describe(record));
            }
            for failure in &report.failures {
                eprintln!("{}: {}", failure.path.display(), error_chain(&failure.error));
            }
            if !report.failures.is_empty() {
                bail!("{} of {} files could not be added", report.failures.len(), files.len());
            }
        }
        Command::Import { folder } => {
            let report = library.import_folder(&folder)?;
            for record in &report.ingested {
                println!("{}", describe(record));
            }
            for failure in &report.failures {
                eprintln!("{}: {}", failure.path.display(), error_chain(&failure.error));
            }
            if !report.failures.is_empty() {
                bail!("{} files could not be added", report.failures.len());
            }
        }
        Command::Remove { ids } => {
            let report = library.delete_many(ids.iter().copied());
            for failure in &report.failures {
                eprintln!("photo {}: {}", failure.id, error_chain(&failure.error));
            }
            if !report.failures.is_empty() {
                bail!("{} of {} photos could not be removed", report.failures.len(), ids.len());
            }
        }
        Command::List => {
            for record in library.list()? {
                println!("{}", describe(&record));
            }
        }
        Command::Show { id } => {
            let record = library.get(id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Rotate { id, ccw } => {
            let rotation = if ccw {
                Rotation::CounterClockwise
            } else {
                Rotation::Clockwise
            };
            library.rotate(id, rotation)?;
        }
        Command::Grid { width } => {
            let columns = columns_for_width(width, config.cell_size);
            for line in grid_lines(&library.list()?, columns) {
                println!("{line}");
            }
        }
        Command::Map => {
            let view = library.map_view(config.map.center, config.map.zoom)?;
            println!("{}", view.to_json().context("serialize map view")?);
        }
        Command::Clear => library.clear()?,
    }

    Ok(())
}

/// `outer: cause: root cause`, since the batch reports hold bare errors.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn describe(record: &PhotoRecord) -> String {
    match record.geotag {
        Some(g) => format!(
            "{}\t{}\t{:.6}, {:.6}",
            record.id,
            record.full_image_path.display(),
            g.latitude,
            g.longitude
        ),
        None => format!("{}\t{}\t-", record.id, record.full_image_path.display()),
    }
}

/// One tab-separated line of photo ids per grid row; empty cells are `-`.
fn grid_lines(records: &[PhotoRecord], columns: usize) -> Vec<String> {
    (0..row_count(records.len(), columns))
        .map(|row| {
            (0..columns)
                .map(|col| match item_at(records, GridPosition::new(row, col), columns) {
                    Some(record) => record.id.to_string(),
                    None => "-".to_string(),
                })
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use photomap_catalog::Geotag;

    fn record(id: PhotoId, geotag: Option<Geotag>) -> PhotoRecord {
        PhotoRecord {
            id,
            full_image_path: PathBuf::from(format!("/lib/images/{id}.jpg")),
            thumbnail_path: PathBuf::from(format!("/lib/icons/{id}.jpg")),
            geotag,
        }
    }

    #[test]
    fn grid_pads_last_row() {
        let records: Vec<_> = (1..=5).map(|id| record(id, None)).collect();
        assert_eq!(grid_lines(&records, 3), vec!["1\t2\t3", "4\t5\t-"]);
        assert_eq!(grid_lines(&records, 5), vec!["1\t2\t3\t4\t5"]);
        assert!(grid_lines(&[], 3).is_empty());
    }

    #[test]
    fn describe_with_and_without_location() {
        assert_eq!(describe(&record(2, None)), "2\t/lib/images/2.jpg\t-");
        assert_eq!(
            describe(&record(3, Some(Geotag::new(40.446111, -79.982222)))),
            "3\t/lib/images/3.jpg\t40.446111, -79.982222"
        );
    }

    #[test]
    fn error_chain_includes_causes() {
        let err = photomap_catalog::CatalogError::Deletion {
            id: 1,
            path: PathBuf::from("/lib/images/1.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            error_chain(&err),
            "failed to remove artifact /lib/images/1.jpg of photo 1: gone"
        );
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["photomap", "--library", "/tmp/lib", "rotate", "4", "--ccw"])
            .unwrap();
        assert_eq!(cli.library, Some(PathBuf::from("/tmp/lib")));
        assert!(matches!(cli.command, Command::Rotate { id: 4, ccw: true }));

        assert!(Cli::try_parse_from(["photomap", "add"]).is_err());
    }
}
