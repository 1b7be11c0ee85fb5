//! Archiver: pack the tile sequence into one in-memory zip.
//!
//! Entries are written in sequence order under `{index}.jpg`, so extracting
//! the archive and sorting names numerically gives back the posting order
//! with no side-car metadata. Every entry carries the same fixed timestamp;
//! the same tiles always produce the same bytes.
//!
//! Building is all-or-nothing: the blob only exists once the central
//! directory has been written. Any failure before that drops the partial
//! buffer and surfaces [`GridError::ArchiveBuild`].

use crate::error::{GridError, Result};
use crate::naming;
use crate::types::{ArchiveBlob, TileSequence};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Write};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Suggested file name for the downloaded archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "instagram-grid.zip";

/// How entries are stored in the zip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    #[default]
    Deflated,
    Stored,
}

impl ArchiveCompression {
    fn method(self) -> CompressionMethod {
        match self {
            Self::Deflated => CompressionMethod::Deflated,
            Self::Stored => CompressionMethod::Stored,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub file_name: String,
    pub compression: ArchiveCompression,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression: ArchiveCompression::default(),
        }
    }
}

/// One file read back out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    /// Posting index parsed from the name, if it is a tile entry.
    pub index: Option<u32>,
    pub bytes: Vec<u8>,
}

/// Build the archive on the blocking pool.
///
/// Fails with [`GridError::EmptyInput`] for an empty sequence before any work
/// is scheduled.
pub async fn build_archive(tiles: &TileSequence, options: &ArchiveOptions) -> Result<ArchiveBlob> {
    if tiles.is_empty() {
        return Err(GridError::EmptyInput);
    }
    // Tile bytes are reference-counted; this clone copies no pixel data.
    let tiles = tiles.clone();
    let options = options.clone();
    tokio::task::spawn_blocking(move || write_archive(&tiles, &options))
        .await
        .map_err(|e| GridError::ArchiveBuild(format!("archive task failed: {e}")))?
}

/// Synchronous body of [`build_archive`].
pub fn write_archive(tiles: &TileSequence, options: &ArchiveOptions) -> Result<ArchiveBlob> {
    if tiles.is_empty() {
        return Err(GridError::EmptyInput);
    }

    let entry_options = SimpleFileOptions::default()
        .compression_method(options.compression.method())
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (position, tile) in tiles.iter().enumerate() {
        let expected = position as u32 + 1;
        if tile.index != expected {
            return Err(GridError::ArchiveBuild(format!(
                "tile at position {position} has index {}, expected {expected}",
                tile.index
            )));
        }

        let name = naming::tile_entry_name(tile.index);
        zip.start_file(name.as_str(), entry_options)
            .map_err(|e| archive_error(&name, e))?;
        zip.write_all(&tile.bytes)
            .map_err(|e| archive_error(&name, e))?;
        debug!(entry = %name, bytes = tile.bytes.len(), "added archive entry");
    }

    let bytes = zip
        .finish()
        .map_err(|e| GridError::ArchiveBuild(format!("finalising archive: {e}")))?
        .into_inner();

    info!(
        entries = tiles.len(),
        bytes = bytes.len(),
        file_name = %options.file_name,
        "archive ready"
    );
    Ok(ArchiveBlob::new(bytes, options.file_name.clone()))
}

fn archive_error(entry: &str, err: impl std::fmt::Display) -> GridError {
    GridError::ArchiveBuild(format!("writing {entry}: {err}"))
}

/// Read every entry of an archive, sorted into posting order.
///
/// Tile entries are ordered by numeric index; any other entries follow in
/// name order.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| GridError::ArchiveBuild(format!("opening archive: {e}")))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| GridError::ArchiveBuild(format!("reading entry {i}: {e}")))?;
        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| archive_error(&name, e))?;
        entries.push(ArchiveEntry {
            index: naming::parse_tile_entry_name(&name),
            name,
            bytes: data,
        });
    }

    entries.sort_by(|a, b| naming::compare_entry_names(&a.name, &b.name));
    Ok(entries)
}
