//! Payloads exchanged with the rendering widget.
//!
//! The widget draws display-space shapes over the resized image and returns
//! the shape the reviewer selected or drew, in the same loose JSON layout:
//!
//! ```json
//! {"shapeId": 3, "shapeType": "rectangle", "label": "car",
//!  "left": 10, "top": 12, "width": 40, "height": 20, "attributes": {}}
//! ```
//!
//! Splines and boundaries carry `points: [{"x", "y", "r"}]`, polygons
//! `points: [{"x", "y"}]`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::attributes::Attributes;
use super::bbox::Rect;
use super::coord::{Point, RadialPoint};
use super::ids::ShapeId;
use super::model::{Geometry, Shape, ShapeDraft, ShapeKind};
use super::space::Display;
use crate::error::ReviewError;

/// Colour used when no label-specific colour applies.
pub const DEFAULT_SHAPE_COLOR: &str = "magenta";

/// Picks the stroke colour for a label.
pub fn shape_color_for_label(label: Option<&str>) -> &'static str {
    match label {
        Some("boundary") => "blue",
        Some("spline") => "green",
        Some("polygon") => "purple",
        _ => DEFAULT_SHAPE_COLOR,
    }
}

/// A shape in the widget's JSON layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetShape {
    #[serde(alias = "shape_id")]
    pub shape_id: ShapeId,

    pub shape_type: String,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Value>>,
}

impl WidgetShape {
    /// Converts a display-space shape into the widget layout.
    pub fn from_shape(shape: &Shape<Display>) -> Self {
        let mut out = WidgetShape {
            shape_id: shape.id(),
            shape_type: shape.kind().widget_tag().to_string(),
            label: shape.label.clone(),
            attributes: shape.attributes.to_raw(),
            left: None,
            top: None,
            width: None,
            height: None,
            points: None,
        };

        match &shape.geometry {
            Geometry::Box(rect) => {
                out.left = Some(rect.left);
                out.top = Some(rect.top);
                out.width = Some(rect.width);
                out.height = Some(rect.height);
            }
            Geometry::Spline(points) | Geometry::Boundary(points) => {
                out.points = Some(
                    points
                        .iter()
                        .map(|p| json!({"x": p.x, "y": p.y, "r": p.r}))
                        .collect(),
                );
            }
            Geometry::Polygon(points) => {
                out.points = Some(points.iter().map(|p| json!({"x": p.x, "y": p.y})).collect());
            }
        }

        out
    }

    /// Parses the widget layout into a typed display-space draft.
    ///
    /// The draft requests the widget's `shapeId`.
    ///
    /// # Errors
    /// `UnknownShapeType` for an unrecognized `shapeType`, `MalformedShape`
    /// when the fields required by the type are missing or invalid.
    pub fn to_draft(&self) -> Result<ShapeDraft<Display>, ReviewError> {
        let kind = ShapeKind::from_widget_tag(&self.shape_type)
            .ok_or_else(|| ReviewError::UnknownShapeType(self.shape_type.clone()))?;

        let geometry = match kind {
            ShapeKind::Box => {
                let field = |value: Option<f64>, name: &str| {
                    value.ok_or_else(|| ReviewError::MalformedShape {
                        kind,
                        reason: format!("missing field '{}'", name),
                    })
                };
                Geometry::Box(Rect::new(
                    field(self.left, "left")?,
                    field(self.top, "top")?,
                    field(self.width, "width")?,
                    field(self.height, "height")?,
                ))
            }
            ShapeKind::Spline => Geometry::Spline(self.parse_points::<RadialPoint<Display>>(kind)?),
            ShapeKind::Boundary => {
                Geometry::Boundary(self.parse_points::<RadialPoint<Display>>(kind)?)
            }
            ShapeKind::Polygon => Geometry::Polygon(self.parse_points::<Point<Display>>(kind)?),
        };

        let (attributes, _) = Attributes::from_raw(kind, &self.attributes);

        Ok(ShapeDraft {
            id: Some(self.shape_id),
            label: self.label.clone(),
            geometry,
            attributes,
            verification: None,
        })
    }

    fn parse_points<P>(&self, kind: ShapeKind) -> Result<Vec<P>, ReviewError>
    where
        P: serde::de::DeserializeOwned,
    {
        let points = self
            .points
            .as_ref()
            .ok_or_else(|| ReviewError::MalformedShape {
                kind,
                reason: "missing field 'points'".to_string(),
            })?;

        points
            .iter()
            .enumerate()
            .map(|(i, value)| {
                P::deserialize(value).map_err(|e| ReviewError::MalformedShape {
                    kind,
                    reason: format!("point {}: {}", i, e),
                })
            })
            .collect()
    }
}

/// Everything the widget needs to draw one image.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub image_name: String,
    pub display_width: u32,
    pub display_height: u32,
    pub shape_color: &'static str,
    pub shapes: Vec<WidgetShape>,
}

impl RenderRequest {
    /// Builds a request; the colour is picked from the first shape's label.
    pub fn new(
        image_name: impl Into<String>,
        display_width: u32,
        display_height: u32,
        shapes: &[Shape<Display>],
    ) -> Self {
        let shape_color = shape_color_for_label(shapes.first().map(|s| s.label.as_str()));
        Self {
            image_name: image_name.into(),
            display_width,
            display_height,
            shape_color,
            shapes: shapes.iter().map(WidgetShape::from_shape).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> WidgetShape {
        serde_json::from_value(value).expect("widget shape")
    }

    #[test]
    fn rectangle_parses_into_box_draft() {
        let widget = parse(json!({
            "shape_id": 7,
            "shapeType": "rectangle",
            "label": "car",
            "left": 10, "top": 12, "width": 40, "height": 20
        }));
        let draft = widget.to_draft().expect("valid rectangle");

        assert_eq!(draft.id, Some(ShapeId(7)));
        assert_eq!(draft.label, "car");
        assert_eq!(draft.geometry, Geometry::Box(Rect::new(10.0, 12.0, 40.0, 20.0)));
    }

    #[test]
    fn spline_point_without_radius_is_malformed() {
        let widget = parse(json!({
            "shapeId": 1,
            "shapeType": "spline",
            "points": [{"x": 1, "y": 2, "r": 3}, {"x": 4, "y": 5}]
        }));
        let err = widget.to_draft().expect_err("second point lacks r");
        match err {
            ReviewError::MalformedShape { kind, reason } => {
                assert_eq!(kind, ShapeKind::Spline);
                assert!(reason.starts_with("point 1"), "{}", reason);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn box_without_height_is_malformed() {
        let widget = parse(json!({
            "shapeId": 1, "shapeType": "rectangle", "left": 1, "top": 1, "width": 1
        }));
        assert!(matches!(
            widget.to_draft(),
            Err(ReviewError::MalformedShape {
                kind: ShapeKind::Box,
                ..
            })
        ));
    }

    #[test]
    fn unknown_widget_type_is_rejected() {
        let widget = parse(json!({"shapeId": 1, "shapeType": "ellipse"}));
        assert!(matches!(
            widget.to_draft(),
            Err(ReviewError::UnknownShapeType(t)) if t == "ellipse"
        ));
    }

    #[test]
    fn empty_polygon_is_not_an_error() {
        let widget = parse(json!({"shapeId": 2, "shapeType": "polygon", "points": []}));
        let draft = widget.to_draft().expect("empty polygon");
        assert_eq!(draft.geometry, Geometry::Polygon(vec![]));
    }

    #[test]
    fn colour_follows_first_label() {
        assert_eq!(shape_color_for_label(Some("spline")), "green");
        assert_eq!(shape_color_for_label(Some("car")), DEFAULT_SHAPE_COLOR);
        assert_eq!(shape_color_for_label(None), DEFAULT_SHAPE_COLOR);
    }
}
