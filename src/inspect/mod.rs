//! Review progress inspection.
//!
//! Every image is loaded the same way a review session loads it, so the
//! counts match what the reviewer sees: objects dropped on load are counted
//! separately and never as shapes.

mod report;

pub use report::{ImageProgress, InspectReport, KindCount, SummarySection, VerdictCount};

use std::collections::BTreeMap;

use crate::ir::{LabelFile, ShapeKind};
use crate::review::ErrorCode;
use crate::store::ShapeStore;

/// Options for inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { bar_width: 20 }
    }
}

/// Inspects a label file and produces a review progress report.
pub fn inspect_label_file(labels: &LabelFile, opts: &InspectOptions) -> InspectReport {
    let mut summary = SummarySection {
        images: labels.images.len(),
        ..Default::default()
    };
    let mut kinds: BTreeMap<ShapeKind, usize> = BTreeMap::new();
    let mut verdicts: BTreeMap<ErrorCode, usize> = BTreeMap::new();
    let mut images = Vec::with_capacity(labels.images.len());

    for record in &labels.images {
        let (store, load_report) = ShapeStore::load(record);
        let mut progress = ImageProgress {
            name: record.name.clone(),
            shapes: store.len(),
            reviewed: 0,
            dropped: load_report.dropped(),
        };

        for shape in store.shapes() {
            *kinds.entry(shape.kind()).or_default() += 1;
            match shape.verification.as_ref().map(|v| v.error_code) {
                None => summary.unreviewed += 1,
                Some(ErrorCode::Untagged) => {
                    summary.untagged += 1;
                    *verdicts.entry(ErrorCode::Untagged).or_default() += 1;
                }
                Some(code) => {
                    progress.reviewed += 1;
                    *verdicts.entry(code).or_default() += 1;
                }
            }
        }

        summary.shapes += progress.shapes;
        summary.reviewed += progress.reviewed;
        summary.dropped += progress.dropped;
        if progress.is_complete() {
            summary.completed_images += 1;
        }
        images.push(progress);
    }

    InspectReport {
        summary,
        kinds: ShapeKind::ALL
            .into_iter()
            .map(|kind| KindCount {
                kind,
                count: kinds.get(&kind).copied().unwrap_or(0),
            })
            .collect(),
        verdicts: ErrorCode::ALL
            .into_iter()
            .map(|error_code| VerdictCount {
                error_code,
                count: verdicts.get(&error_code).copied().unwrap_or(0),
            })
            .collect(),
        images,
        bar_width: opts.bar_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::io_json::from_json_str;

    fn sample() -> LabelFile {
        from_json_str(
            r#"{"images": [
                {"name": "a.jpg", "objects": [
                  {"id": 1, "type": "box", "label": "car", "points": [0, 0, 5, 5],
                   "verification_result": {"error_code": "Correct", "comment": ""}},
                  {"id": 2, "type": "spline", "label": "lane", "points": [[1, 1, 1]],
                   "verification_result": {"error_code": "WrongGeometry", "comment": "too short"}},
                  {"id": 3, "type": "circle", "label": "x", "points": []}
                ]},
                {"name": "b.jpg", "objects": [
                  {"id": 1, "type": "polygon", "label": "sign", "points": [[0, 0], [1, 0], [1, 1]],
                   "verification_result": {"error_code": "Untagged", "comment": ""}},
                  {"id": 2, "type": "box", "label": "bus", "points": [0, 0, 9, 9]}
                ]},
                {"name": "c.jpg", "objects": []}
            ]}"#,
        )
        .expect("label file")
    }

    fn count<T: PartialEq>(entries: &[(T, usize)], key: T) -> usize {
        entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    #[test]
    fn summary_counts_review_progress() {
        let report = inspect_label_file(&sample(), &InspectOptions::default());
        let s = &report.summary;

        assert_eq!(s.images, 3);
        assert_eq!(s.shapes, 4);
        assert_eq!(s.reviewed, 2);
        assert_eq!(s.untagged, 1);
        assert_eq!(s.unreviewed, 1);
        assert_eq!(s.dropped, 1);
        // a.jpg: both loadable shapes reviewed; c.jpg has nothing to review.
        assert_eq!(s.completed_images, 2);
    }

    #[test]
    fn histograms_cover_every_kind_and_code() {
        let report = inspect_label_file(&sample(), &InspectOptions::default());
        assert_eq!(report.kinds.len(), ShapeKind::ALL.len());
        assert_eq!(report.verdicts.len(), ErrorCode::ALL.len());

        let kinds: Vec<_> = report.kinds.iter().map(|k| (k.kind, k.count)).collect();
        assert_eq!(count(&kinds, ShapeKind::Box), 2);
        assert_eq!(count(&kinds, ShapeKind::Boundary), 0);

        let verdicts: Vec<_> = report
            .verdicts
            .iter()
            .map(|v| (v.error_code, v.count))
            .collect();
        assert_eq!(count(&verdicts, ErrorCode::Correct), 1);
        assert_eq!(count(&verdicts, ErrorCode::WrongGeometry), 1);
        assert_eq!(count(&verdicts, ErrorCode::Untagged), 1);
        assert_eq!(count(&verdicts, ErrorCode::Duplicate), 0);
    }

    #[test]
    fn text_output_lists_images() {
        let report = inspect_label_file(&sample(), &InspectOptions::default());
        let text = report.to_string();
        assert!(text.contains("Review Progress Report"));
        assert!(text.contains("b.jpg"));
        assert!(text.contains("1 dropped"));
    }
}
