//! Native point layouts of the label file.
//!
//! - box: `[left, top, right, bottom]`
//! - spline / boundary: `[[x, y, r], ...]`
//! - polygon: `[[x, y], ...]`

use serde_json::Value;

use crate::error::ReviewError;
use crate::ir::{Geometry, Native, Point, RadialPoint, Rect, ShapeKind};
use crate::review::VerificationResult;

/// Decodes the raw `points` value of a label object.
///
/// # Errors
/// `MalformedShape` if the layout does not match `kind`.
pub(crate) fn decode_geometry(kind: ShapeKind, points: &Value) -> Result<Geometry<Native>, ReviewError> {
    let malformed = |reason: String| ReviewError::MalformedShape { kind, reason };

    match kind {
        ShapeKind::Box => {
            let [left, top, right, bottom] =
                numbers::<4>(points).map_err(|e| malformed(format!("points: {}", e)))?;
            Ok(Geometry::Box(Rect::from_ltrb(left, top, right, bottom)))
        }
        ShapeKind::Spline | ShapeKind::Boundary => {
            let points = point_list(points)
                .map_err(malformed)?
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    numbers::<3>(p)
                        .map(|[x, y, r]| RadialPoint::new(x, y, r))
                        .map_err(|e| malformed(format!("point {}: {}", i, e)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if kind == ShapeKind::Spline {
                Geometry::Spline(points)
            } else {
                Geometry::Boundary(points)
            })
        }
        ShapeKind::Polygon => {
            let points = point_list(points)
                .map_err(malformed)?
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    numbers::<2>(p)
                        .map(|[x, y]| Point::new(x, y))
                        .map_err(|e| malformed(format!("point {}: {}", i, e)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::Polygon(points))
        }
    }
}

/// Encodes geometry into the native point layout.
pub(crate) fn encode_geometry(geometry: &Geometry<Native>) -> Value {
    match geometry {
        Geometry::Box(rect) => Value::from(rect.to_ltrb().to_vec()),
        Geometry::Spline(points) | Geometry::Boundary(points) => Value::Array(
            points
                .iter()
                .map(|p| Value::from(vec![p.x, p.y, p.r]))
                .collect(),
        ),
        Geometry::Polygon(points) => Value::Array(
            points
                .iter()
                .map(|p| Value::from(vec![p.x, p.y]))
                .collect(),
        ),
    }
}

/// Decodes a raw verification result.
pub(crate) fn decode_verification(raw: &Value) -> Result<VerificationResult, serde_json::Error> {
    serde::Deserialize::deserialize(raw)
}

/// Encodes a verification result for the label file.
pub(crate) fn encode_verification(result: &VerificationResult) -> Value {
    serde_json::json!({
        "error_code": result.error_code.as_str(),
        "comment": result.comment,
    })
}

fn point_list(value: &Value) -> Result<&Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Err("missing points".to_string()),
        other => Err(format!("expected a list of points, found {}", type_name(other))),
    }
}

fn numbers<const N: usize>(value: &Value) -> Result<[f64; N], String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("expected {} numbers, found {}", N, type_name(value)))?;
    if items.len() != N {
        return Err(format!("expected {} numbers, found {}", N, items.len()));
    }

    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .ok_or_else(|| format!("expected a number, found {}", type_name(item)))?;
    }
    Ok(out)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
