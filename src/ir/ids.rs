//! Newtype ID for type-safe identification of shapes.
//!
//! Using a newtype prevents accidentally passing an image index where a
//! shape identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique, stable identifier for a shape within one image.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl ShapeId {
    /// Creates a new ShapeId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the id directly after this one, or `None` at `u64::MAX`.
    #[inline]
    pub(crate) fn successor(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for ShapeId {
    fn from(id: u64) -> Self {
        ShapeId::new(id)
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeId({})", self.0)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
