//! Data writers for classification results.
//!
//! Rendered images are written by the plotting backends; this module owns the
//! filesystem plumbing around them and the per-object label table.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::loaders::PointSet;
use crate::processors::classification::GroupMasks;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Point set and group masks cover different objects.
    #[error("length mismatch: point set has {points_len} objects, masks cover {masks_len}")]
    LengthMismatch { points_len: usize, masks_len: usize },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Creates a directory (and its parents) if it doesn't exist.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| WriteError::CreateDirectory {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// Write one row per object with its coordinates and primary group name.
///
/// Objects matching more than one of the identified groups are labelled with
/// the first one in priority order.
///
/// # Errors
///
/// Returns an error if the masks were computed for a different point set or
/// the file cannot be written.
pub fn write_labels_csv(path: &Path, points: &PointSet, masks: &GroupMasks) -> Result<()> {
    if points.len() != masks.len() {
        return Err(WriteError::LengthMismatch {
            points_len: points.len(),
            masks_len: masks.len(),
        });
    }

    ensure_parent_dirs(path)?;

    let path_str = path.display().to_string();
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path_str.clone(),
        source: e,
    })?;
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));

    csv_writer
        .write_record(["x", "y", "z", "group"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for (i, coord) in points.iter().enumerate() {
        csv_writer
            .write_record(&[
                format!("{:.6}", coord[0]),
                format!("{:.6}", coord[1]),
                format!("{:.6}", coord[2]),
                masks.primary_group(i).name().to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}
