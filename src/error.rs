/// Error types for the minimap
///
/// - `MetadataError`: scan description missing or unusable (fatal to `load`)
/// - `UnitMismatch`: axis not in meters (warning only)
/// - `ThumbnailError`: a single tile image failed to decode (tile stays an outline)
/// - `HistogramError`: the selected tile's image could not be read for its histogram
/// - `CaptureError`: annotation capture failed

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::grid::tile::Axis;

/// Failure to build a tile grid from a scan directory
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("scan directory {0} has no base name")]
    InvalidDirectory(PathBuf),

    #[error("cannot read scan description {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed scan description {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("tile {index} is missing attribute {attribute}")]
    MissingTileAttribute { index: usize, attribute: &'static str },

    #[error("{axis} dimension is missing attribute {attribute}")]
    MissingAxisAttribute { axis: Axis, attribute: &'static str },

    #[error("invalid value {value:?} for attribute {attribute}")]
    InvalidValue { attribute: &'static str, value: String },

    #[error("scan description declares no {0} dimension")]
    MissingAxis(Axis),
}

/// Non-fatal: the declared unit is not meters, so physical readings are off
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{axis} unit is {unit:?}, not meters. Scale readings will be wrong")]
pub struct UnitMismatch {
    pub axis: Axis,
    pub unit: String,
}

/// A tile's image could not be turned into a thumbnail
#[derive(Debug, Error)]
#[error("cannot decode {path}: {source}")]
pub struct ThumbnailError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

#[derive(Debug, Error)]
#[error("cannot read {path} for its histogram: {source}")]
pub struct HistogramError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Every numbered variant of a file name is already taken
    #[error("exceeded {attempts} files with the same base name as {path}")]
    ResourceExhausted { path: PathBuf, attempts: usize },

    #[error("capture I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize annotation: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot save view {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid box coordinate {0:?}")]
    InvalidBox(String),
}
