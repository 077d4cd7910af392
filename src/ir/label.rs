//! Native label file schema.
//!
//! These types mirror the on-disk layout one to one. Geometry is kept as raw
//! JSON here because each shape type uses its own point layout; the
//! [`ShapeStore`](crate::store::ShapeStore) decodes it into typed shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::ids::ShapeId;

/// A label file: an ordered list of image records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelFile {
    /// All images, in review order.
    #[serde(default)]
    pub images: Vec<ImageRecord>,

    /// Top-level fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LabelFile {
    /// Position of the image with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.images.iter().position(|image| image.name == name)
    }
}

/// One image and the objects labeled on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Image file name, relative to the image directory.
    pub name: String,

    /// Original width in pixels, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Original height in pixels, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Lowest identifier never handed out for this image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_shape_id: Option<ShapeId>,

    /// Labeled objects, in insertion order.
    #[serde(default)]
    pub objects: Vec<LabelObject>,

    /// Image-level fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ImageRecord {
    /// Creates a record without objects.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Records the original image dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Returns the recorded dimensions, if both are present.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

/// A labeled object in native encoding.
///
/// Point layouts by `type`:
/// - `box`: `[left, top, right, bottom]`
/// - `spline`, `boundary`: `[[x, y, r], ...]`
/// - `polygon`: `[[x, y], ...]`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ShapeId>,

    #[serde(rename = "type")]
    pub object_type: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub points: Value,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    /// Raw verification result; decoded leniently so that an unknown error
    /// code does not make the whole file unreadable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
