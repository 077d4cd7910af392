//! Mapping between original-image and display coordinates.
//!
//! The display image is the original shrunk (never enlarged) so that it fits
//! a bounded frame. The clamp runs in two passes: width first, then the
//! height of the width-adjusted image. Each axis keeps its own ratio.
//!
//! Numeric policy: native coordinates stay floating point; every display
//! coordinate is truncated to a whole pixel. A native→display→native round
//! trip therefore moves a value by less than one display pixel, i.e. by less
//! than the axis ratio in native pixels.

use clap::ValueEnum;

use crate::error::ReviewError;
use crate::ir::{Display, Geometry, Native, Point, RadialPoint, Rect, Shape, ShapeDraft};

/// Default frame size for the display image.
pub const DEFAULT_MAX_DISPLAY: u32 = 1000;

/// How spline and boundary radii are scaled.
///
/// A radius is not tied to one axis. Historically it followed the width
/// ratio; the geometric mean of both ratios is available for images whose
/// axes were scaled differently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RadiusScale {
    /// Divide radii by the width ratio.
    #[default]
    Width,
    /// Divide radii by `sqrt(ratio_w * ratio_h)`.
    GeometricMean,
}

/// Bounding frame for the display image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayPolicy {
    pub max_width: u32,
    pub max_height: u32,
    pub radius: RadiusScale,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_DISPLAY,
            max_height: DEFAULT_MAX_DISPLAY,
            radius: RadiusScale::default(),
        }
    }
}

/// Scale relation between one original image and its display version.
///
/// Computed when an image is opened and discarded when another image is
/// shown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleContext {
    pub original_width: u32,
    pub original_height: u32,
    pub display_width: u32,
    pub display_height: u32,
    /// `original_width / display_width`, at least 1.
    pub ratio_w: f64,
    /// `original_height / display_height`, at least 1.
    pub ratio_h: f64,
    pub radius: RadiusScale,
}

/// Computes the display size for an image.
///
/// # Errors
/// `InvalidDimensions` if any dimension or maximum is zero.
pub fn compute_scale(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> Result<ScaleContext, ReviewError> {
    if original_width == 0 || original_height == 0 {
        return Err(ReviewError::InvalidDimensions {
            width: original_width,
            height: original_height,
        });
    }
    if max_width == 0 || max_height == 0 {
        return Err(ReviewError::InvalidDimensions {
            width: max_width,
            height: max_height,
        });
    }

    let (mut width, mut height) = (original_width, original_height);
    if width > max_width {
        height = shrink(height, max_width, width);
        width = max_width;
    }
    if height > max_height {
        width = shrink(width, max_height, height);
        height = max_height;
    }

    let ctx = ScaleContext {
        original_width,
        original_height,
        display_width: width,
        display_height: height,
        ratio_w: f64::from(original_width) / f64::from(width),
        ratio_h: f64::from(original_height) / f64::from(height),
        radius: RadiusScale::default(),
    };
    tracing::debug!(
        original = %format!("{}x{}", original_width, original_height),
        display = %format!("{}x{}", width, height),
        ratio_w = ctx.ratio_w,
        ratio_h = ctx.ratio_h,
        "computed display scale"
    );
    Ok(ctx)
}

/// `value * numerator / denominator`, truncated, at least 1.
fn shrink(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(numerator) / u64::from(denominator);
    // scaled <= value because numerator < denominator
    (scaled as u32).max(1)
}

impl ScaleContext {
    /// Computes the scale for an image under a display policy.
    pub fn for_image(width: u32, height: u32, policy: &DisplayPolicy) -> Result<Self, ReviewError> {
        let ctx = compute_scale(width, height, policy.max_width, policy.max_height)?;
        Ok(ctx.with_radius_scale(policy.radius))
    }

    pub fn with_radius_scale(mut self, radius: RadiusScale) -> Self {
        self.radius = radius;
        self
    }

    /// Returns true if the display image is the original size.
    pub fn is_identity(&self) -> bool {
        self.ratio_w == 1.0 && self.ratio_h == 1.0
    }

    /// The ratio radii are divided by.
    pub fn ratio_r(&self) -> f64 {
        match self.radius {
            RadiusScale::Width => self.ratio_w,
            RadiusScale::GeometricMean => (self.ratio_w * self.ratio_h).sqrt(),
        }
    }

    /// Maps native geometry into display space.
    pub fn geometry_to_display(&self, geometry: &Geometry<Native>) -> Geometry<Display> {
        let (rw, rh, rr) = (self.ratio_w, self.ratio_h, self.ratio_r());
        let px = |v: f64, ratio: f64| (v / ratio).trunc();

        match geometry {
            Geometry::Box(rect) => Geometry::Box(Rect::new(
                px(rect.left, rw),
                px(rect.top, rh),
                px(rect.width, rw),
                px(rect.height, rh),
            )),
            Geometry::Spline(points) => Geometry::Spline(
                points
                    .iter()
                    .map(|p| RadialPoint::new(px(p.x, rw), px(p.y, rh), px(p.r, rr)))
                    .collect(),
            ),
            Geometry::Boundary(points) => Geometry::Boundary(
                points
                    .iter()
                    .map(|p| RadialPoint::new(px(p.x, rw), px(p.y, rh), px(p.r, rr)))
                    .collect(),
            ),
            Geometry::Polygon(points) => Geometry::Polygon(
                points
                    .iter()
                    .map(|p| Point::new(px(p.x, rw), px(p.y, rh)))
                    .collect(),
            ),
        }
    }

    /// Maps display geometry back into native space.
    pub fn geometry_to_original(&self, geometry: &Geometry<Display>) -> Geometry<Native> {
        let (rw, rh, rr) = (self.ratio_w, self.ratio_h, self.ratio_r());

        match geometry {
            Geometry::Box(rect) => Geometry::Box(Rect::new(
                rect.left * rw,
                rect.top * rh,
                rect.width * rw,
                rect.height * rh,
            )),
            Geometry::Spline(points) => Geometry::Spline(
                points
                    .iter()
                    .map(|p| RadialPoint::new(p.x * rw, p.y * rh, p.r * rr))
                    .collect(),
            ),
            Geometry::Boundary(points) => Geometry::Boundary(
                points
                    .iter()
                    .map(|p| RadialPoint::new(p.x * rw, p.y * rh, p.r * rr))
                    .collect(),
            ),
            Geometry::Polygon(points) => Geometry::Polygon(
                points
                    .iter()
                    .map(|p| Point::new(p.x * rw, p.y * rh))
                    .collect(),
            ),
        }
    }

    /// Maps a stored shape into display space.
    pub fn to_display(&self, shape: &Shape<Native>) -> Shape<Display> {
        shape.with_geometry(self.geometry_to_display(&shape.geometry))
    }

    /// Maps a display shape back into native space.
    pub fn to_original(&self, shape: &Shape<Display>) -> Shape<Native> {
        shape.with_geometry(self.geometry_to_original(&shape.geometry))
    }

    /// Maps a draft coming from the widget back into native space.
    pub fn draft_to_original(&self, draft: ShapeDraft<Display>) -> ShapeDraft<Native> {
        let geometry = self.geometry_to_original(&draft.geometry);
        ShapeDraft {
            id: draft.id,
            label: draft.label,
            geometry,
            attributes: draft.attributes,
            verification: draft.verification,
        }
    }

    /// Native-space crop rectangle for a shape preview, clamped to the image.
    ///
    /// Returns `None` for shapes without points or with an empty clamped area.
    pub fn preview_region(&self, shape: &Shape<Native>) -> Option<Rect<Native>> {
        let region = shape.geometry.bounds()?.clamp_to(
            f64::from(self.original_width),
            f64::from(self.original_height),
        );
        (region.width > 0.0 && region.height > 0.0).then_some(region)
    }
}
