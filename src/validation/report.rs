//! Validation report types for structured error reporting.
//!
//! Reports can be printed for the reviewer or serialized as JSON for
//! scripts.

use serde::Serialize;
use std::fmt;

use crate::ir::ShapeId;

/// The result of validating a label file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if any issue carries this code.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Summary plus issues, the layout of `validate --output json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error_count": self.error_count(),
            "warning_count": self.warning_count(),
            "issues": self.issues,
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    pub message: String,

    /// Where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The file loads, but something may be off.
    Warning,
    /// The object or image would be dropped or mis-scaled.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // Image issues
    /// Two image records share a name.
    DuplicateImageName,
    /// An image record has an empty name.
    EmptyImageName,
    /// Width or height is recorded as zero.
    InvalidImageDimensions,
    /// Only one of width and height is recorded.
    PartialImageDimensions,
    /// `next_shape_id` is not above every object id.
    StaleNextShapeId,

    // Object issues
    /// Two objects of one image share an id.
    DuplicateShapeId,
    /// An object has no id; one will be assigned on load.
    MissingShapeId,
    /// The type tag is not box, spline, boundary or polygon.
    UnknownShapeType,
    /// The points do not match the type's layout.
    MalformedPoints,
    /// An object has an empty label.
    EmptyLabel,
    /// A coordinate or radius is NaN or infinite.
    NonFiniteCoordinates,
    /// A box has right < left or bottom < top.
    InvalidBoxOrdering,
    /// A radius is negative.
    NegativeRadius,
    /// Geometry extends outside the recorded image size.
    OutOfBounds,
    /// A spline or boundary has no points.
    EmptyPointList,
    /// A polygon has fewer than three points.
    DegeneratePolygon,
    /// The verification result cannot be decoded.
    InvalidVerificationResult,
    /// An attribute key is not part of the shape type's taxonomy.
    UntypedAttribute,
}

/// Where a validation issue occurred.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum IssueContext {
    /// The label file as a whole.
    LabelFile,
    /// One image record.
    Image { image: String },
    /// One object, by position and id if it has one.
    Object {
        image: String,
        index: usize,
        id: Option<ShapeId>,
    },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::LabelFile => write!(f, "label file"),
            IssueContext::Image { image } => write!(f, "image '{}'", image),
            IssueContext::Object {
                image,
                index,
                id: Some(id),
            } => write!(f, "image '{}' object {} (id {})", image, index, id),
            IssueContext::Object {
                image,
                index,
                id: None,
            } => write!(f, "image '{}' object {}", image, index),
        }
    }
}
