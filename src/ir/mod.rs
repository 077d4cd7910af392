//! Shape model and label file representation.
//!
//! This module defines the typed representation of labeled shapes and the
//! native label file they are read from and written to.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Coordinates carry a marker type ([`Native`] or
//!    [`Display`]) so original-image and display coordinates cannot be mixed,
//!    and the shape type is a closed enum matched exhaustively.
//!
//! 2. **Stable Identity**: A [`Shape`]'s [`ShapeId`] is private and assigned
//!    only by the shape store.
//!
//! 3. **Lossless Passthrough**: Fields of the label file that are not
//!    interpreted here are carried along and written back unchanged.
//!
//! # Example
//!
//! ```
//! use labelreview::ir::{Geometry, Native, Rect, ShapeDraft};
//!
//! let draft: ShapeDraft<Native> =
//!     ShapeDraft::new("car", Geometry::Box(Rect::new(10.0, 10.0, 50.0, 50.0)));
//! assert_eq!(draft.geometry.bounds().map(|b| b.to_ltrb()), Some([10.0, 10.0, 60.0, 60.0]));
//! ```

mod attributes;
mod bbox;
mod coord;
mod ids;
pub mod io_json;
pub mod io_widget;
mod label;
mod model;
mod space;

// Re-export core types for convenient access
pub use attributes::{AttributeKey, Attributes};
pub use bbox::Rect;
pub use coord::{Point, RadialPoint};
pub use ids::ShapeId;
pub use label::{ImageRecord, LabelFile, LabelObject};
pub use model::{Geometry, Shape, ShapeDraft, ShapeKind};
pub use space::{Display, Native};
