//! Reviewer verdicts attached to shapes.
//!
//! A verdict ([`VerificationResult`]) is an [`ErrorCode`] plus a free-text
//! comment. Shapes start without one; freshly drawn shapes are flagged
//! [`ErrorCode::Untagged`] until the reviewer classifies them, and only shapes
//! still in that state may be deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;
use crate::ir::{Native, ShapeDraft, ShapeId};
use crate::store::ShapeStore;

/// The closed set of review error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Not reviewed yet. Newly drawn shapes start here.
    Untagged,
    /// The shape is labeled correctly.
    Correct,
    /// The class label is wrong.
    WrongLabel,
    /// The geometry does not fit the object.
    WrongGeometry,
    /// One or more attributes are wrong.
    WrongAttribute,
    /// There is no object here.
    FalsePositive,
    /// Another shape already covers this object.
    Duplicate,
    /// Anything else; see the comment.
    Other,
}

impl ErrorCode {
    /// All codes, in the order offered to the reviewer.
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::Untagged,
        ErrorCode::Correct,
        ErrorCode::WrongLabel,
        ErrorCode::WrongGeometry,
        ErrorCode::WrongAttribute,
        ErrorCode::FalsePositive,
        ErrorCode::Duplicate,
        ErrorCode::Other,
    ];

    /// The code as written in the label file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Untagged => "Untagged",
            ErrorCode::Correct => "Correct",
            ErrorCode::WrongLabel => "WrongLabel",
            ErrorCode::WrongGeometry => "WrongGeometry",
            ErrorCode::WrongAttribute => "WrongAttribute",
            ErrorCode::FalsePositive => "FalsePositive",
            ErrorCode::Duplicate => "Duplicate",
            ErrorCode::Other => "Other",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = ErrorCode::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown error code '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// A reviewer's verdict on one shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub error_code: ErrorCode,
    #[serde(default)]
    pub comment: String,
}

impl VerificationResult {
    pub fn new(error_code: ErrorCode, comment: impl Into<String>) -> Self {
        Self {
            error_code,
            comment: comment.into(),
        }
    }

    /// The verdict given to freshly drawn shapes.
    pub fn untagged() -> Self {
        Self::new(ErrorCode::Untagged, "")
    }

    pub fn is_untagged(&self) -> bool {
        self.error_code == ErrorCode::Untagged
    }
}

/// Creates or overwrites the verdict of a shape.
///
/// # Errors
/// `NotFound` if the shape is not in the store.
pub fn set_review(
    store: &mut ShapeStore,
    id: ShapeId,
    error_code: ErrorCode,
    comment: impl Into<String>,
) -> Result<(), ReviewError> {
    let comment = comment.into();
    store.update(id, |shape| {
        if shape.verification.is_none() && error_code == ErrorCode::Untagged {
            tracing::debug!(shape = %id, "shape pending classification");
        }
        shape.verification = Some(VerificationResult::new(error_code, comment));
    })
}

/// Returns the verdict of a shape, if the shape exists and has one.
pub fn get_review(store: &ShapeStore, id: ShapeId) -> Option<&VerificationResult> {
    store
        .get_by_id(id)
        .ok()
        .and_then(|shape| shape.verification.as_ref())
}

/// Returns true only if the shape exists and is still flagged Untagged.
pub fn is_deletable(store: &ShapeStore, id: ShapeId) -> bool {
    get_review(store, id).is_some_and(VerificationResult::is_untagged)
}

/// Adds a newly drawn shape, flagged Untagged with an empty comment.
///
/// # Errors
/// `ShapeIdsExhausted` if the image has no ids left.
pub fn add_untagged(
    store: &mut ShapeStore,
    draft: ShapeDraft<Native>,
) -> Result<ShapeId, ReviewError> {
    let id = store.add(draft.with_verification(VerificationResult::untagged()))?;
    tracing::info!(shape = %id, image = %store.image_name(), "untagged shape added");
    Ok(id)
}

/// Deletes a shape if the deletion policy allows it.
///
/// # Errors
/// `NotFound` if the shape is absent, `NotDeletable` if its verdict is
/// missing or anything other than Untagged.
pub fn delete_untagged(store: &mut ShapeStore, id: ShapeId) -> Result<(), ReviewError> {
    let error_code = store
        .get_by_id(id)?
        .verification
        .as_ref()
        .map(|r| r.error_code);
    if error_code != Some(ErrorCode::Untagged) {
        return Err(ReviewError::NotDeletable { id, error_code });
    }

    store.remove(id);
    tracing::info!(shape = %id, image = %store.image_name(), "untagged shape deleted");
    Ok(())
}
