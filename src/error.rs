use std::path::PathBuf;
use thiserror::Error;

use crate::ir::{AttributeKey, ShapeId, ShapeKind};
use crate::review::ErrorCode;
use crate::validation::ValidationReport;

/// The main error type for labelreview operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse label JSON from {path}: {source}")]
    LabelJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write label JSON to {path}: {source}")]
    LabelJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown shape type '{0}'")]
    UnknownShapeType(String),

    #[error("Malformed {kind} shape: {reason}")]
    MalformedShape { kind: ShapeKind, reason: String },

    #[error("Attribute '{key}' does not apply to {kind} shapes")]
    AttributeNotApplicable { key: AttributeKey, kind: ShapeKind },

    #[error("Shape {0} not found in the current image")]
    NotFound(ShapeId),

    #[error("No shape ids left for image '{0}'")]
    ShapeIdsExhausted(String),

    #[error("Shape {id} cannot be deleted: only Untagged shapes can")]
    NotDeletable {
        id: ShapeId,
        error_code: Option<ErrorCode>,
    },

    #[error("Image index {index} is out of range (label file has {len} image(s))")]
    ImageIndexOutOfRange { index: usize, len: usize },

    #[error("No image named '{0}' in the label file")]
    ImageNotFound(String),

    #[error("Label file contains no images")]
    EmptyLabelFile,

    #[error("Invalid dimensions {width}x{height} (must be positive)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid image dimensions for {path}: {message}")]
    ImageDimensionInvalid { path: PathBuf, message: String },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
