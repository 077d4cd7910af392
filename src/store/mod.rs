//! Shape store for the image under review.
//!
//! The store owns the shapes of exactly one image, in insertion order, and
//! is the only place where [`ShapeId`]s are handed out. Identifiers are
//! unique within the image and never reused: the store keeps a high-water
//! mark (written back as `next_shape_id`) and remembers every id removed
//! during the session. `u64::MAX` is never handed out; a mark that reaches
//! it means the image has run out of ids.

pub(crate) mod codec;
mod report;

pub use report::{LoadIssue, LoadIssueCode, LoadReport, LoadSeverity};

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::ReviewError;
use crate::ir::{
    Attributes, ImageRecord, LabelObject, Native, Shape, ShapeDraft, ShapeId, ShapeKind,
};

/// Shapes of one image in native coordinates.
#[derive(Clone, Debug, Default)]
pub struct ShapeStore {
    image_name: String,
    width: Option<u32>,
    height: Option<u32>,
    image_extra: BTreeMap<String, Value>,
    shapes: Vec<Shape<Native>>,
    object_extra: HashMap<ShapeId, BTreeMap<String, Value>>,
    next_id: ShapeId,
    retired: BTreeSet<ShapeId>,
}

impl ShapeStore {
    /// Creates an empty store for an image.
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            next_id: ShapeId(1),
            ..Default::default()
        }
    }

    /// Builds a store from an image record.
    ///
    /// Objects with an unknown type tag or malformed geometry are dropped;
    /// objects with a duplicate id get a fresh one. Every such decision is
    /// logged and recorded in the returned [`LoadReport`].
    pub fn load(record: &ImageRecord) -> (Self, LoadReport) {
        let mut report = LoadReport::new(&record.name);
        report.objects = record.objects.len();

        // Ids of every object, dropped ones included, count towards the
        // high-water mark so that none of them is handed out again.
        let highest = record
            .objects
            .iter()
            .filter_map(|o| o.id)
            .filter(|id| id.successor().is_some())
            .max();
        let next_id = [record.next_shape_id, highest.and_then(|id| id.successor())]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(ShapeId(1))
            .max(ShapeId(1));

        let mut store = Self {
            image_name: record.name.clone(),
            width: record.width,
            height: record.height,
            image_extra: record.extra.clone(),
            next_id,
            ..Default::default()
        };

        for (index, object) in record.objects.iter().enumerate() {
            let Some(kind) = ShapeKind::from_tag(&object.object_type) else {
                store.retire(object.id);
                tracing::warn!(
                    image = %record.name,
                    object = index,
                    shape_type = %object.object_type,
                    "dropping object with unknown shape type"
                );
                report.add(LoadIssue::warning(
                    LoadIssueCode::UnknownShapeType,
                    index,
                    format!("unknown shape type '{}'", object.object_type),
                ));
                continue;
            };

            let draft = match store.decode_object(kind, object, index, &mut report) {
                Ok(draft) => draft,
                Err(err) => {
                    store.retire(object.id);
                    tracing::warn!(image = %record.name, object = index, "dropping object: {}", err);
                    report.add(LoadIssue::warning(
                        LoadIssueCode::MalformedShape,
                        index,
                        err.to_string(),
                    ));
                    continue;
                }
            };

            let id = match draft.id {
                Some(id) => {
                    store.insert(id, draft);
                    id
                }
                None => match store.add(draft) {
                    Ok(id) => id,
                    Err(err) => {
                        tracing::warn!(image = %record.name, object = index, "dropping object: {}", err);
                        report.add(LoadIssue::warning(
                            LoadIssueCode::ShapeIdsExhausted,
                            index,
                            err.to_string(),
                        ));
                        continue;
                    }
                },
            };
            if !object.extra.is_empty() {
                store.object_extra.insert(id, object.extra.clone());
            }
            report.loaded += 1;
        }

        (store, report)
    }

    fn decode_object(
        &self,
        kind: ShapeKind,
        object: &LabelObject,
        index: usize,
        report: &mut LoadReport,
    ) -> Result<ShapeDraft<Native>, ReviewError> {
        let geometry = codec::decode_geometry(kind, &object.points)?;

        let (attributes, untyped) = Attributes::from_raw(kind, &object.attributes);
        if !untyped.is_empty() {
            report.add(LoadIssue::info(
                LoadIssueCode::UntypedAttribute,
                index,
                format!(
                    "attribute(s) {} are not part of the {} taxonomy and are kept verbatim",
                    untyped.join(", "),
                    kind
                ),
            ));
        }

        let verification = match &object.verification_result {
            None | Some(Value::Null) => None,
            Some(raw) => match codec::decode_verification(raw) {
                Ok(result) => Some(result),
                Err(err) => {
                    tracing::warn!(image = %self.image_name, object = index, "dropping verification result: {}", err);
                    report.add(LoadIssue::warning(
                        LoadIssueCode::InvalidVerificationResult,
                        index,
                        format!("verification result dropped: {}", err),
                    ));
                    None
                }
            },
        };

        let mut draft = ShapeDraft::new(object.label.clone(), geometry);
        draft.attributes = attributes;
        draft.verification = verification;

        if let Some(id) = object.id {
            if id.successor().is_none() {
                tracing::warn!(image = %self.image_name, object = index, shape = %id, "reserved shape id");
                report.add(LoadIssue::warning(
                    LoadIssueCode::ReservedShapeId,
                    index,
                    format!("shape id {} is reserved, assigning a fresh id", id),
                ));
            } else if self.contains(id) || self.retired.contains(&id) {
                tracing::warn!(image = %self.image_name, object = index, shape = %id, "duplicate shape id");
                report.add(LoadIssue::warning(
                    LoadIssueCode::DuplicateShapeId,
                    index,
                    format!("shape id {} already used, assigning a fresh id", id),
                ));
            } else {
                draft.id = Some(id);
            }
        }

        Ok(draft)
    }

    fn retire(&mut self, id: Option<ShapeId>) {
        if let Some(id) = id {
            self.retired.insert(id);
        }
    }

    /// Name of the image this store belongs to.
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// Original image dimensions, if the record carried them.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// All shapes, in insertion order.
    pub fn shapes(&self) -> &[Shape<Native>] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Returns true if a shape with this id is present.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.iter().any(|s| s.id() == id)
    }

    /// Looks up a shape by id.
    ///
    /// # Errors
    /// `NotFound` if no shape has this id.
    pub fn get_by_id(&self, id: ShapeId) -> Result<&Shape<Native>, ReviewError> {
        self.shapes
            .iter()
            .find(|s| s.id() == id)
            .ok_or(ReviewError::NotFound(id))
    }

    /// Appends a shape and returns its identifier.
    ///
    /// The requested id is kept only if it was never handed out for this
    /// image, i.e. it is at or above the high-water mark, and is not
    /// `u64::MAX`; otherwise a fresh id is assigned.
    ///
    /// # Errors
    /// `ShapeIdsExhausted` if a fresh id is needed and the mark has reached
    /// `u64::MAX`.
    pub fn add(&mut self, draft: ShapeDraft<Native>) -> Result<ShapeId, ReviewError> {
        let id = match draft.id {
            Some(id) if id >= self.next_id && id.successor().is_some() => id,
            _ if self.next_id.successor().is_some() => self.next_id,
            _ => return Err(ReviewError::ShapeIdsExhausted(self.image_name.clone())),
        };
        self.insert(id, draft);
        Ok(id)
    }

    /// Stores a shape under `id`, which must be below `u64::MAX`.
    fn insert(&mut self, id: ShapeId, draft: ShapeDraft<Native>) {
        if let Some(next) = id.successor().filter(|next| *next > self.next_id) {
            self.next_id = next;
        }
        self.shapes.push(Shape::from_draft(id, draft));
    }

    /// Removes a shape. Removing an absent shape is a no-op.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape<Native>> {
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        self.retired.insert(id);
        self.object_extra.remove(&id);
        Some(self.shapes.remove(index))
    }

    /// Applies an in-place change to a shape.
    ///
    /// # Errors
    /// `NotFound` if no shape has this id.
    pub fn update<F>(&mut self, id: ShapeId, mutate: F) -> Result<(), ReviewError>
    where
        F: FnOnce(&mut Shape<Native>),
    {
        let shape = self
            .shapes
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(ReviewError::NotFound(id))?;
        mutate(shape);
        Ok(())
    }

    /// Renders the store back into the native image record.
    pub fn to_label_format(&self) -> ImageRecord {
        let objects = self
            .shapes
            .iter()
            .map(|shape| LabelObject {
                id: Some(shape.id()),
                object_type: shape.kind().as_str().to_string(),
                label: shape.label.clone(),
                points: codec::encode_geometry(&shape.geometry),
                attributes: shape.attributes.to_raw(),
                verification_result: shape
                    .verification
                    .as_ref()
                    .map(codec::encode_verification),
                extra: self
                    .object_extra
                    .get(&shape.id())
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        ImageRecord {
            name: self.image_name.clone(),
            width: self.width,
            height: self.height,
            next_shape_id: Some(self.next_id),
            objects,
            extra: self.image_extra.clone(),
        }
    }
}
