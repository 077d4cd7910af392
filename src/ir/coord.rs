//! Typed point values using PhantomData for compile-time safety.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A 2D polygon vertex with a type-level marker for the coordinate space.
///
/// The `TSpace` parameter should be either [`Native`](super::Native) or
/// [`Display`](super::Display), so that original-image and display
/// coordinates cannot be accidentally mixed.
#[derive(Clone, Copy, PartialEq)]
pub struct Point<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Point<TSpace> {
    /// Creates a new point with the given x and y values.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Returns true if both coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A spline or boundary control point: a position plus a radius.
#[derive(Clone, Copy, PartialEq)]
pub struct RadialPoint<TSpace> {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> RadialPoint<TSpace> {
    /// Creates a new radial point.
    #[inline]
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self {
            x,
            y,
            r,
            _space: PhantomData,
        }
    }

    /// Returns true if position and radius are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.r.is_finite()
    }
}

impl<TSpace> std::fmt::Debug for Point<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Point")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<TSpace> std::fmt::Debug for RadialPoint<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadialPoint")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("r", &self.r)
            .finish()
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for Point<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Point", 2)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Point<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct PointData {
            x: f64,
            y: f64,
        }
        let data = PointData::deserialize(deserializer)?;
        Ok(Point::new(data.x, data.y))
    }
}

impl<TSpace> Serialize for RadialPoint<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("RadialPoint", 3)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.serialize_field("r", &self.r)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for RadialPoint<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RadialPointData {
            x: f64,
            y: f64,
            r: f64,
        }
        let data = RadialPointData::deserialize(deserializer)?;
        Ok(RadialPoint::new(data.x, data.y, data.r))
    }
}
