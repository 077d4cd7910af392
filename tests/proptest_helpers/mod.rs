#![allow(dead_code)]

use labelreview::ir::{Geometry, Native, Point, RadialPoint, Rect, ShapeDraft};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Original image sizes, from thumbnails up to large aerial frames.
pub fn arb_image_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=12_000, 1u32..=12_000)
}

/// Display frame limits.
pub fn arb_max_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=2_000, 1u32..=2_000)
}

/// A coordinate inside an image of the given extent.
fn coord(extent: u32) -> BoxedStrategy<f64> {
    (0.0..=f64::from(extent)).boxed()
}

fn arb_radial(width: u32, height: u32) -> BoxedStrategy<RadialPoint<Native>> {
    (coord(width), coord(height), 0.0..50.0f64)
        .prop_map(|(x, y, r)| RadialPoint::new(x, y, r))
        .boxed()
}

fn arb_point(width: u32, height: u32) -> BoxedStrategy<Point<Native>> {
    (coord(width), coord(height))
        .prop_map(|(x, y)| Point::new(x, y))
        .boxed()
}

/// Native geometry of any kind, inside a `width` x `height` image.
pub fn arb_geometry(width: u32, height: u32) -> BoxedStrategy<Geometry<Native>> {
    prop_oneof![
        (coord(width), coord(height), coord(width), coord(height)).prop_map(|(a, b, c, d)| {
            Geometry::Box(Rect::from_ltrb(a.min(c), b.min(d), a.max(c), b.max(d)))
        }),
        prop::collection::vec(arb_radial(width, height), 0..8).prop_map(Geometry::Spline),
        prop::collection::vec(arb_radial(width, height), 0..8).prop_map(Geometry::Boundary),
        prop::collection::vec(arb_point(width, height), 0..8).prop_map(Geometry::Polygon),
    ]
    .boxed()
}

pub fn arb_label() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["car", "lane", "boundary", "sign", "bus", ""]).prop_map(String::from)
}

/// Drafts without a requested id.
pub fn arb_draft(width: u32, height: u32) -> BoxedStrategy<ShapeDraft<Native>> {
    (arb_label(), arb_geometry(width, height))
        .prop_map(|(label, geometry)| ShapeDraft::new(label, geometry))
        .boxed()
}

/// Every coordinate of `geometry`, flattened as (value, axis ratio) pairs.
///
/// Radii are paired with `ratio_r`.
pub fn coords_with_ratios(
    geometry: &Geometry<Native>,
    ratio_w: f64,
    ratio_h: f64,
    ratio_r: f64,
) -> Vec<(f64, f64)> {
    match geometry {
        Geometry::Box(rect) => vec![
            (rect.left, ratio_w),
            (rect.top, ratio_h),
            (rect.width, ratio_w),
            (rect.height, ratio_h),
        ],
        Geometry::Spline(points) | Geometry::Boundary(points) => points
            .iter()
            .flat_map(|p| [(p.x, ratio_w), (p.y, ratio_h), (p.r, ratio_r)])
            .collect(),
        Geometry::Polygon(points) => points
            .iter()
            .flat_map(|p| [(p.x, ratio_w), (p.y, ratio_h)])
            .collect(),
    }
}

/// Same kind, same number of points, every coordinate within `eps`.
pub fn geometry_close(a: &Geometry<Native>, b: &Geometry<Native>, eps: f64) -> bool {
    let ca = coords_with_ratios(a, 1.0, 1.0, 1.0);
    let cb = coords_with_ratios(b, 1.0, 1.0, 1.0);
    a.kind() == b.kind()
        && ca.len() == cb.len()
        && ca.iter().zip(&cb).all(|((x, _), (y, _))| (x - y).abs() <= eps)
}
