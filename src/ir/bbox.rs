//! Axis-aligned rectangle in left/top/width/height form.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// An axis-aligned box shape (left, top, width, height).
///
/// The label file stores boxes as left/top/right/bottom; the in-memory form
/// keeps width and height because that is what the rendering surface edits.
///
/// Note: the constructor does NOT enforce positive width/height, so that a
/// malformed box from a label file can still be represented and reported by
/// validation.
#[derive(Clone, Copy, PartialEq)]
pub struct Rect<TSpace> {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Rect<TSpace> {
    /// Creates a new rectangle from its top-left corner and size.
    #[inline]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            _space: PhantomData,
        }
    }

    /// Creates a rectangle from left/top/right/bottom edges.
    #[inline]
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Returns the right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Returns the bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Converts to left/top/right/bottom.
    #[inline]
    pub fn to_ltrb(&self) -> [f64; 4] {
        [self.left, self.top, self.right(), self.bottom()]
    }

    /// Returns true if all fields are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Returns true if width and height are not negative.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    /// Clamps the rectangle to `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        let left = self.left.clamp(0.0, width);
        let top = self.top.clamp(0.0, height);
        let right = self.right().clamp(0.0, width);
        let bottom = self.bottom().clamp(0.0, height);
        Self::from_ltrb(left, top, right.max(left), bottom.max(top))
    }
}

impl<TSpace> std::fmt::Debug for Rect<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rect")
            .field("left", &self.left)
            .field("top", &self.top)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<TSpace> Default for Rect<TSpace> {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for Rect<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Rect", 4)?;
        state.serialize_field("left", &self.left)?;
        state.serialize_field("top", &self.top)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Rect<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RectData {
            left: f64,
            top: f64,
            width: f64,
            height: f64,
        }
        let data = RectData::deserialize(deserializer)?;
        Ok(Rect::new(data.left, data.top, data.width, data.height))
    }
}
