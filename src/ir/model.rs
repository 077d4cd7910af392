//! Core shape model for the review layer.
//!
//! A [`Shape`] is a labeled geometric region of one image. The coordinate
//! space is a type parameter so that shapes read from the label file
//! ([`Native`]) and shapes handed to the rendering surface ([`Display`]) are
//! different types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::attributes::{AttributeKey, Attributes};
use super::bbox::Rect;
use super::coord::{Point, RadialPoint};
use super::ids::ShapeId;
use super::space::Native;
use crate::error::ReviewError;
use crate::review::VerificationResult;

/// The closed set of shape types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Spline,
    Boundary,
    Polygon,
}

impl ShapeKind {
    /// All kinds, in display order.
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Box,
        ShapeKind::Spline,
        ShapeKind::Boundary,
        ShapeKind::Polygon,
    ];

    /// The type tag used by the label file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Spline => "spline",
            ShapeKind::Boundary => "boundary",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// Parses a label file type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "box" => Some(ShapeKind::Box),
            "spline" => Some(ShapeKind::Spline),
            "boundary" => Some(ShapeKind::Boundary),
            "polygon" => Some(ShapeKind::Polygon),
            _ => None,
        }
    }

    /// The type tag used by the rendering widget (boxes are "rectangle").
    pub fn widget_tag(&self) -> &'static str {
        match self {
            ShapeKind::Box => "rectangle",
            other => other.as_str(),
        }
    }

    /// Parses a widget type tag. Accepts the label file tags as well.
    pub fn from_widget_tag(tag: &str) -> Option<Self> {
        match tag {
            "rectangle" => Some(ShapeKind::Box),
            other => Self::from_tag(other),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry of a shape, one variant per [`ShapeKind`].
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry<TSpace> {
    Box(Rect<TSpace>),
    Spline(Vec<RadialPoint<TSpace>>),
    Boundary(Vec<RadialPoint<TSpace>>),
    Polygon(Vec<Point<TSpace>>),
}

impl<TSpace> Geometry<TSpace> {
    /// The kind tag matching this variant.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Box(_) => ShapeKind::Box,
            Geometry::Spline(_) => ShapeKind::Spline,
            Geometry::Boundary(_) => ShapeKind::Boundary,
            Geometry::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Number of stored points (boxes count as two corners).
    pub fn point_count(&self) -> usize {
        match self {
            Geometry::Box(_) => 2,
            Geometry::Spline(points) | Geometry::Boundary(points) => points.len(),
            Geometry::Polygon(points) => points.len(),
        }
    }

    /// Returns true if every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Geometry::Box(rect) => rect.is_finite(),
            Geometry::Spline(points) | Geometry::Boundary(points) => {
                points.iter().all(RadialPoint::is_finite)
            }
            Geometry::Polygon(points) => points.iter().all(Point::is_finite),
        }
    }

    /// The axis-aligned bounding rectangle, radii included.
    ///
    /// Returns `None` for an empty point sequence.
    pub fn bounds(&self) -> Option<Rect<TSpace>> {
        let extents: Vec<(f64, f64, f64, f64)> = match self {
            Geometry::Box(rect) => {
                return Some(Rect::new(rect.left, rect.top, rect.width, rect.height))
            }
            Geometry::Spline(points) | Geometry::Boundary(points) => points
                .iter()
                .map(|p| (p.x - p.r, p.y - p.r, p.x + p.r, p.y + p.r))
                .collect(),
            Geometry::Polygon(points) => points.iter().map(|p| (p.x, p.y, p.x, p.y)).collect(),
        };

        extents
            .into_iter()
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
            .map(|(l, t, r, b)| Rect::from_ltrb(l, t, r, b))
    }
}

/// A labeled shape with a stable identifier.
///
/// The identifier can only be assigned by the [`ShapeStore`](crate::store::ShapeStore),
/// and never changes afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape<TSpace = Native> {
    id: ShapeId,

    /// Class label (e.g. "car", "lane").
    pub label: String,

    /// Geometry in `TSpace` coordinates.
    pub geometry: Geometry<TSpace>,

    /// Classification attributes.
    pub attributes: Attributes,

    /// Reviewer verdict, absent until the first review action.
    pub verification: Option<VerificationResult>,
}

impl<TSpace> Shape<TSpace> {
    pub(crate) fn from_draft(id: ShapeId, draft: ShapeDraft<TSpace>) -> Self {
        Self {
            id,
            label: draft.label,
            geometry: draft.geometry,
            attributes: draft.attributes,
            verification: draft.verification,
        }
    }

    /// The stable identifier.
    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// The shape kind, derived from the geometry.
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Sets or clears an attribute, checking that it applies to this kind.
    pub fn set_attribute(
        &mut self,
        key: AttributeKey,
        value: Option<String>,
    ) -> Result<(), ReviewError> {
        let kind = self.kind();
        if !key.applies_to(kind) {
            return Err(ReviewError::AttributeNotApplicable { key, kind });
        }
        self.attributes.set(key, value);
        Ok(())
    }

    /// Same shape with geometry in another coordinate space.
    pub(crate) fn with_geometry<T>(&self, geometry: Geometry<T>) -> Shape<T> {
        Shape {
            id: self.id,
            label: self.label.clone(),
            geometry,
            attributes: self.attributes.clone(),
            verification: self.verification.clone(),
        }
    }
}

/// A shape that has not been stored yet.
///
/// `id` is a requested identifier (e.g. the one the widget generated for a
/// freshly drawn shape); the store decides whether it can be kept.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeDraft<TSpace = Native> {
    pub id: Option<ShapeId>,
    pub label: String,
    pub geometry: Geometry<TSpace>,
    pub attributes: Attributes,
    pub verification: Option<VerificationResult>,
}

impl<TSpace> ShapeDraft<TSpace> {
    /// Creates a draft with the minimum required fields.
    pub fn new(label: impl Into<String>, geometry: Geometry<TSpace>) -> Self {
        Self {
            id: None,
            label: label.into(),
            geometry,
            attributes: Attributes::new(),
            verification: None,
        }
    }

    /// Requests a specific identifier.
    pub fn with_id(mut self, id: impl Into<ShapeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attaches a verification result.
    pub fn with_verification(mut self, verification: VerificationResult) -> Self {
        self.verification = Some(verification);
        self
    }

    /// Sets an attribute, checking that it applies to the geometry kind.
    pub fn with_attribute(
        mut self,
        key: AttributeKey,
        value: impl Into<String>,
    ) -> Result<Self, ReviewError> {
        let kind = self.geometry.kind();
        if !key.applies_to(kind) {
            return Err(ReviewError::AttributeNotApplicable { key, kind });
        }
        self.attributes.set(key, Some(value.into()));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Display;

    #[test]
    fn test_kind_tags() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_tag(kind.as_str()), Some(kind));
            assert_eq!(ShapeKind::from_widget_tag(kind.widget_tag()), Some(kind));
        }
        assert_eq!(ShapeKind::from_tag("rectangle"), None);
        assert_eq!(ShapeKind::from_tag("circle"), None);
    }

    #[test]
    fn test_spline_bounds_include_radius() {
        let geometry: Geometry<Native> = Geometry::Spline(vec![
            RadialPoint::new(10.0, 20.0, 2.0),
            RadialPoint::new(30.0, 5.0, 1.0),
        ]);
        let bounds = geometry.bounds().expect("non-empty spline");
        assert_eq!(bounds.to_ltrb(), [8.0, 4.0, 31.0, 22.0]);
    }

    #[test]
    fn test_empty_polygon_has_no_bounds() {
        let geometry: Geometry<Display> = Geometry::Polygon(vec![]);
        assert!(geometry.bounds().is_none());
        assert_eq!(geometry.point_count(), 0);
    }

    #[test]
    fn test_draft_rejects_foreign_attribute() {
        let draft: ShapeDraft<Native> =
            ShapeDraft::new("car", Geometry::Box(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let err = draft
            .with_attribute(AttributeKey::Color, "white")
            .expect_err("boxes have no color attribute");
        assert!(matches!(
            err,
            ReviewError::AttributeNotApplicable {
                key: AttributeKey::Color,
                kind: ShapeKind::Box
            }
        ));
    }
}
