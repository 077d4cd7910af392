//! Label file validation.
//!
//! Checks a label file before review for:
//! - structural integrity (unique image names, unique shape ids)
//! - decodability (known shape types, point layouts, verification results)
//! - geometric validity (finite, ordered, within the recorded image size)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashMap;

use crate::ir::{Attributes, Geometry, ImageRecord, LabelFile, LabelObject, Native, ShapeKind};
use crate::store::codec;

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// Tolerance in pixels for out-of-bounds checks.
    pub oob_tolerance_px: f64,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            oob_tolerance_px: 0.5,
        }
    }
}

/// Validates a label file and returns a report of all issues found.
pub fn validate_label_file(labels: &LabelFile, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let mut seen_names: HashMap<&str, usize> = HashMap::new();

    for (idx, image) in labels.images.iter().enumerate() {
        if image.name.is_empty() {
            report.add(ValidationIssue::error(
                IssueCode::EmptyImageName,
                format!("Image record {} has an empty name", idx),
                IssueContext::LabelFile,
            ));
        } else if let Some(first_idx) = seen_names.get(image.name.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateImageName,
                format!(
                    "Duplicate image name (first seen at index {}); navigation by name is ambiguous",
                    first_idx
                ),
                IssueContext::Image {
                    image: image.name.clone(),
                },
            ));
        } else {
            seen_names.insert(&image.name, idx);
        }

        validate_image(image, opts, &mut report);
    }

    report
}

fn validate_image(image: &ImageRecord, opts: &ValidateOptions, report: &mut ValidationReport) {
    let context = || IssueContext::Image {
        image: image.name.clone(),
    };

    let dims = match (image.width, image.height) {
        (Some(0), _) | (_, Some(0)) => {
            report.add(ValidationIssue::error(
                IssueCode::InvalidImageDimensions,
                format!(
                    "Invalid dimensions {}x{} (must be positive)",
                    image.width.unwrap_or(0),
                    image.height.unwrap_or(0)
                ),
                context(),
            ));
            None
        }
        (Some(w), Some(h)) => Some((f64::from(w), f64::from(h))),
        (None, None) => None,
        _ => {
            report.add(ValidationIssue::warning(
                IssueCode::PartialImageDimensions,
                "Only one of width and height is recorded; the image header will be read instead",
                context(),
            ));
            None
        }
    };

    let mut seen_ids: HashMap<u64, usize> = HashMap::new();
    for (index, object) in image.objects.iter().enumerate() {
        let Some(id) = object.id else {
            report.add(ValidationIssue::warning(
                IssueCode::MissingShapeId,
                "Object has no id; a fresh one is assigned on load",
                object_context(image, index, object),
            ));
            validate_object(image, index, object, dims, opts, report);
            continue;
        };

        if let Some(first_idx) = seen_ids.get(&id.as_u64()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateShapeId,
                format!(
                    "Duplicate shape id {} (first seen at object {})",
                    id, first_idx
                ),
                object_context(image, index, object),
            ));
        } else {
            seen_ids.insert(id.as_u64(), index);
        }

        validate_object(image, index, object, dims, opts, report);
    }

    if let (Some(next), Some(highest)) = (image.next_shape_id, seen_ids.keys().max()) {
        if next.as_u64() <= *highest {
            report.add(ValidationIssue::warning(
                IssueCode::StaleNextShapeId,
                format!(
                    "next_shape_id {} is not above the highest object id {}",
                    next, highest
                ),
                context(),
            ));
        }
    }
}

fn object_context(image: &ImageRecord, index: usize, object: &LabelObject) -> IssueContext {
    IssueContext::Object {
        image: image.name.clone(),
        index,
        id: object.id,
    }
}

fn validate_object(
    image: &ImageRecord,
    index: usize,
    object: &LabelObject,
    dims: Option<(f64, f64)>,
    opts: &ValidateOptions,
    report: &mut ValidationReport,
) {
    let context = || object_context(image, index, object);

    if object.label.trim().is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::EmptyLabel,
            "Empty label",
            context(),
        ));
    }

    if let Some(raw) = &object.verification_result {
        if !raw.is_null() {
            if let Err(err) = codec::decode_verification(raw) {
                report.add(ValidationIssue::warning(
                    IssueCode::InvalidVerificationResult,
                    format!("Verification result is dropped on load: {}", err),
                    context(),
                ));
            }
        }
    }

    let Some(kind) = ShapeKind::from_tag(&object.object_type) else {
        report.add(ValidationIssue::error(
            IssueCode::UnknownShapeType,
            format!(
                "Unknown shape type '{}'; the object is dropped on load",
                object.object_type
            ),
            context(),
        ));
        return;
    };

    let (_, untyped) = Attributes::from_raw(kind, &object.attributes);
    if !untyped.is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::UntypedAttribute,
            format!(
                "Attribute(s) {} are not part of the {} taxonomy",
                untyped.join(", "),
                kind
            ),
            context(),
        ));
    }

    let geometry = match codec::decode_geometry(kind, &object.points) {
        Ok(geometry) => geometry,
        Err(err) => {
            report.add(ValidationIssue::error(
                IssueCode::MalformedPoints,
                format!("{}; the object is dropped on load", err),
                context(),
            ));
            return;
        }
    };

    validate_geometry(&geometry, dims, opts, report, context);
}

fn validate_geometry(
    geometry: &Geometry<Native>,
    dims: Option<(f64, f64)>,
    opts: &ValidateOptions,
    report: &mut ValidationReport,
    context: impl Fn() -> IssueContext,
) {
    if !geometry.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::NonFiniteCoordinates,
            "Geometry has non-finite coordinates",
            context(),
        ));
        return;
    }

    // Corner or point positions, radii excluded.
    let positions: Vec<(f64, f64)> = match geometry {
        Geometry::Box(rect) => {
            if !rect.is_ordered() {
                let [l, t, r, b] = rect.to_ltrb();
                report.add(ValidationIssue::error(
                    IssueCode::InvalidBoxOrdering,
                    format!("Box corners out of order: [{}, {}, {}, {}]", l, t, r, b),
                    context(),
                ));
            }
            vec![(rect.left, rect.top), (rect.right(), rect.bottom())]
        }
        Geometry::Spline(points) | Geometry::Boundary(points) => {
            if points.is_empty() {
                report.add(ValidationIssue::warning(
                    IssueCode::EmptyPointList,
                    format!("{} has no points", geometry.kind()),
                    context(),
                ));
            }
            if let Some(p) = points.iter().find(|p| p.r < 0.0) {
                report.add(ValidationIssue::error(
                    IssueCode::NegativeRadius,
                    format!("Negative radius {} at ({}, {})", p.r, p.x, p.y),
                    context(),
                ));
            }
            points.iter().map(|p| (p.x, p.y)).collect()
        }
        Geometry::Polygon(points) => {
            if points.len() < 3 {
                report.add(ValidationIssue::warning(
                    IssueCode::DegeneratePolygon,
                    format!("Polygon has {} point(s), fewer than 3", points.len()),
                    context(),
                ));
            }
            points.iter().map(|p| (p.x, p.y)).collect()
        }
    };

    if let Some((width, height)) = dims {
        let tol = opts.oob_tolerance_px;
        let outside = positions
            .iter()
            .filter(|(x, y)| *x < -tol || *y < -tol || *x > width + tol || *y > height + tol)
            .count();
        if outside > 0 {
            report.add(ValidationIssue::warning(
                IssueCode::OutOfBounds,
                format!(
                    "{} point(s) outside the {}x{} image",
                    outside, width, height
                ),
                context(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::io_json::from_json_str;

    fn validate(json: &str) -> ValidationReport {
        let labels = from_json_str(json).expect("label file");
        validate_label_file(&labels, &ValidateOptions::default())
    }

    #[test]
    fn clean_file_passes() {
        let report = validate(
            r#"{"images": [{"name": "a.jpg", "width": 100, "height": 100, "next_shape_id": 3,
                "objects": [
                  {"id": 1, "type": "box", "label": "car", "points": [10, 10, 60, 60]},
                  {"id": 2, "type": "spline", "label": "lane", "points": [[1, 2, 3]],
                   "attributes": {"type1": "solid"},
                   "verification_result": {"error_code": "Correct", "comment": ""}}
                ]}]}"#,
        );
        assert!(report.is_clean(), "{}", report);
    }

    #[test]
    fn duplicate_ids_and_names_are_errors() {
        let report = validate(
            r#"{"images": [
                {"name": "a.jpg", "objects": [
                  {"id": 4, "type": "box", "label": "car", "points": [0, 0, 1, 1]},
                  {"id": 4, "type": "box", "label": "car", "points": [0, 0, 1, 1]}
                ]},
                {"name": "a.jpg", "objects": []}
            ]}"#,
        );
        assert!(report.has(IssueCode::DuplicateShapeId));
        assert!(report.has(IssueCode::DuplicateImageName));
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn undecodable_objects_are_errors() {
        let report = validate(
            r#"{"images": [{"name": "a.jpg", "objects": [
                {"id": 1, "type": "ellipse", "label": "x", "points": []},
                {"id": 2, "type": "polygon", "label": "x", "points": [[1, 2, 3]]},
                {"id": 3, "type": "box", "label": "x", "points": [10, 10, 5, 5]}
            ]}]}"#,
        );
        assert!(report.has(IssueCode::UnknownShapeType));
        assert!(report.has(IssueCode::MalformedPoints));
        assert!(report.has(IssueCode::InvalidBoxOrdering));
        assert_eq!(report.error_count(), 3);
    }

    #[test]
    fn geometry_warnings() {
        let report = validate(
            r#"{"images": [{"name": "a.jpg", "width": 50, "height": 50, "objects": [
                {"id": 1, "type": "boundary", "label": "edge", "points": []},
                {"id": 2, "type": "polygon", "label": "sign", "points": [[0, 0], [5, 5]]},
                {"id": 3, "type": "box", "label": "", "points": [40, 40, 80, 80]},
                {"type": "box", "label": "car", "points": [0, 0, 1, 1],
                 "verification_result": {"error_code": "Maybe"}}
            ]}]}"#,
        );
        for code in [
            IssueCode::EmptyPointList,
            IssueCode::DegeneratePolygon,
            IssueCode::EmptyLabel,
            IssueCode::OutOfBounds,
            IssueCode::MissingShapeId,
            IssueCode::InvalidVerificationResult,
        ] {
            assert!(report.has(code), "missing {:?}\n{}", code, report);
        }
        assert!(report.is_ok());
    }

    #[test]
    fn stale_next_shape_id_is_reported() {
        let report = validate(
            r#"{"images": [{"name": "a.jpg", "next_shape_id": 2, "objects": [
                {"id": 5, "type": "box", "label": "car", "points": [0, 0, 1, 1]}
            ]}]}"#,
        );
        assert!(report.has(IssueCode::StaleNextShapeId));
    }

    #[test]
    fn json_layout_has_counts_and_scoped_context() {
        let report = validate(r#"{"images": [{"name": "a.jpg", "width": 0, "height": 10}]}"#);
        let json = report.to_json();
        assert_eq!(json["error_count"], 1);
        assert_eq!(json["issues"][0]["code"], "invalid_image_dimensions");
        assert_eq!(json["issues"][0]["context"]["scope"], "image");
        assert_eq!(json["issues"][0]["context"]["image"], "a.jpg");
    }
}
