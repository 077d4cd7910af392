//! Typed per-shape classification attributes.
//!
//! Each shape kind has a closed set of attribute keys. Values are free-form
//! strings chosen from an external taxonomy; `None` means the attribute is
//! present but unset (`null` in the label file).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::model::ShapeKind;

/// A classification field that can be attached to a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    /// Spline shape class.
    #[serde(rename = "type1")]
    Shape,
    /// Single or double line.
    #[serde(rename = "type2")]
    SingleDouble,
    /// Position relative to the ego lane (splines and boundaries).
    #[serde(rename = "type3")]
    Position,
    /// Unusual case marker.
    #[serde(rename = "type4")]
    UnusualCase,
    /// Line colour.
    #[serde(rename = "type5")]
    Color,
    /// Bicycle lane marker.
    #[serde(rename = "type6")]
    Bicycle,
    /// Boundary type.
    #[serde(rename = "boundary")]
    BoundaryType,
    /// Road marker type (polygons).
    #[serde(rename = "type")]
    RoadMarker,
}

const SPLINE_KEYS: &[AttributeKey] = &[
    AttributeKey::Shape,
    AttributeKey::SingleDouble,
    AttributeKey::Position,
    AttributeKey::UnusualCase,
    AttributeKey::Color,
    AttributeKey::Bicycle,
];
const BOUNDARY_KEYS: &[AttributeKey] = &[AttributeKey::Position, AttributeKey::BoundaryType];
const POLYGON_KEYS: &[AttributeKey] = &[AttributeKey::RoadMarker];

impl AttributeKey {
    /// Returns the key as written in the label file.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::Shape => "type1",
            AttributeKey::SingleDouble => "type2",
            AttributeKey::Position => "type3",
            AttributeKey::UnusualCase => "type4",
            AttributeKey::Color => "type5",
            AttributeKey::Bicycle => "type6",
            AttributeKey::BoundaryType => "boundary",
            AttributeKey::RoadMarker => "type",
        }
    }

    /// Parses a label file key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "type1" => Some(AttributeKey::Shape),
            "type2" => Some(AttributeKey::SingleDouble),
            "type3" => Some(AttributeKey::Position),
            "type4" => Some(AttributeKey::UnusualCase),
            "type5" => Some(AttributeKey::Color),
            "type6" => Some(AttributeKey::Bicycle),
            "boundary" => Some(AttributeKey::BoundaryType),
            "type" => Some(AttributeKey::RoadMarker),
            _ => None,
        }
    }

    /// Human-readable title shown next to the selection widget.
    pub fn title(&self) -> &'static str {
        match self {
            AttributeKey::Shape => "1.Shape1(Q)",
            AttributeKey::SingleDouble => "2.Single/Double(W)",
            AttributeKey::Position => "3.Position(E)",
            AttributeKey::UnusualCase => "4.Unusual Case(R)",
            AttributeKey::Color => "5.Color(S)",
            AttributeKey::Bicycle => "6.Bicycle(S)",
            AttributeKey::BoundaryType => "2.Boundary type(R)",
            AttributeKey::RoadMarker => "1.Road marker type(Q)",
        }
    }

    /// The keys that apply to a shape kind, in display order.
    pub fn keys_for(kind: ShapeKind) -> &'static [AttributeKey] {
        match kind {
            ShapeKind::Box => &[],
            ShapeKind::Spline => SPLINE_KEYS,
            ShapeKind::Boundary => BOUNDARY_KEYS,
            ShapeKind::Polygon => POLYGON_KEYS,
        }
    }

    /// Returns true if this key applies to the given kind.
    pub fn applies_to(&self, kind: ShapeKind) -> bool {
        Self::keys_for(kind).contains(self)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute values of a single shape.
///
/// Entries whose key is not part of the shape kind's taxonomy (or whose value
/// is not a string) are kept verbatim in a passthrough map so that writing the
/// label file back does not lose them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<AttributeKey, Option<String>>,
    passthrough: BTreeMap<String, Value>,
}

impl Attributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of an attribute, if set.
    pub fn get(&self, key: AttributeKey) -> Option<&str> {
        self.values.get(&key).and_then(|v| v.as_deref())
    }

    /// Returns true if the key is present, even when its value is unset.
    pub fn contains(&self, key: AttributeKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Sets or clears an attribute. Kind checks happen on [`Shape`](super::Shape).
    pub(crate) fn set(&mut self, key: AttributeKey, value: Option<String>) {
        self.values.insert(key, value);
    }

    /// Iterates typed entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, Option<&str>)> {
        self.values.iter().map(|(k, v)| (*k, v.as_deref()))
    }

    /// Entries carried over without interpretation.
    pub fn passthrough(&self) -> &BTreeMap<String, Value> {
        &self.passthrough
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.passthrough.is_empty()
    }

    /// Builds typed attributes from a raw label-file mapping.
    ///
    /// Returns the attributes together with the raw keys that could not be
    /// typed for `kind`.
    pub(crate) fn from_raw(kind: ShapeKind, raw: &BTreeMap<String, Value>) -> (Self, Vec<String>) {
        let mut attributes = Attributes::new();
        let mut untyped = Vec::new();

        for (name, value) in raw {
            let key = AttributeKey::from_name(name).filter(|key| key.applies_to(kind));
            match (key, value) {
                (Some(key), Value::Null) => attributes.set(key, None),
                (Some(key), Value::String(s)) => attributes.set(key, Some(s.clone())),
                _ => {
                    attributes.passthrough.insert(name.clone(), value.clone());
                    untyped.push(name.clone());
                }
            }
        }

        (attributes, untyped)
    }

    /// Renders the attributes back into a raw label-file mapping.
    pub(crate) fn to_raw(&self) -> BTreeMap<String, Value> {
        let mut raw = self.passthrough.clone();
        for (key, value) in &self.values {
            let value = match value {
                Some(s) => Value::String(s.clone()),
                None => Value::Null,
            };
            raw.insert(key.as_str().to_string(), value);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).expect("raw attribute map")
    }

    #[test]
    fn spline_keys_are_typed_and_null_means_unset() {
        let (attrs, untyped) = Attributes::from_raw(
            ShapeKind::Spline,
            &raw(json!({"type1": "solid", "type5": null})),
        );
        assert!(untyped.is_empty());
        assert_eq!(attrs.get(AttributeKey::Shape), Some("solid"));
        assert_eq!(attrs.get(AttributeKey::Color), None);
        assert!(attrs.contains(AttributeKey::Color));
        assert!(!attrs.contains(AttributeKey::Bicycle));
    }

    #[test]
    fn keys_outside_taxonomy_pass_through() {
        let input = raw(json!({"type": "arrow", "type1": "solid", "score": 3}));
        let (attrs, mut untyped) = Attributes::from_raw(ShapeKind::Polygon, &input);
        untyped.sort();

        assert_eq!(untyped, vec!["score".to_string(), "type1".to_string()]);
        assert_eq!(attrs.get(AttributeKey::RoadMarker), Some("arrow"));
        assert_eq!(attrs.to_raw(), input);
    }

    #[test]
    fn box_has_no_taxonomy() {
        assert!(AttributeKey::keys_for(ShapeKind::Box).is_empty());
        assert!(AttributeKey::Position.applies_to(ShapeKind::Boundary));
        assert!(!AttributeKey::Color.applies_to(ShapeKind::Boundary));
    }

    #[test]
    fn key_names_roundtrip() {
        for kind in [ShapeKind::Spline, ShapeKind::Boundary, ShapeKind::Polygon] {
            for key in AttributeKey::keys_for(kind) {
                assert_eq!(AttributeKey::from_name(key.as_str()), Some(*key));
            }
        }
    }
}
