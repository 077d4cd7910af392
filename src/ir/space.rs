//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between original-image and display coordinates at compile time.

use std::fmt;

/// Marker type for native coordinates.
///
/// Native coordinates are pixel positions in the source image at full
/// resolution. This is the space the label file is written in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Native {}

/// Marker type for display coordinates.
///
/// Display coordinates are whole-pixel positions in the downscaled image
/// shown to the reviewer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Display {}

impl fmt::Debug for Native {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Native has no variants
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Display has no variants
    }
}
