//! Load report types for tracking objects that could not be taken over as-is.
//!
//! This mirrors `validation::ValidationReport`: loading never fails because
//! of a single bad object, it records what happened instead.

use serde::Serialize;
use std::fmt;

/// Issues found while turning an image record into shapes.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LoadReport {
    /// Name of the image the record belongs to.
    pub image: String,
    /// Number of objects in the record.
    pub objects: usize,
    /// Number of shapes that made it into the store.
    pub loaded: usize,
    /// Issues discovered while loading.
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: LoadIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == LoadSeverity::Warning)
            .count()
    }

    /// Count of info-level issues.
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == LoadSeverity::Info)
            .count()
    }

    /// Number of objects that did not make it into the store.
    pub fn dropped(&self) -> usize {
        self.objects - self.loaded
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} of {} object(s) loaded",
            self.image, self.loaded, self.objects
        )?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// A single load issue.
#[derive(Clone, Debug, Serialize)]
pub struct LoadIssue {
    pub severity: LoadSeverity,
    pub code: LoadIssueCode,
    /// Position of the object in the image record.
    pub object_index: usize,
    pub message: String,
}

impl LoadIssue {
    pub fn warning(code: LoadIssueCode, object_index: usize, message: impl Into<String>) -> Self {
        Self {
            severity: LoadSeverity::Warning,
            code,
            object_index,
            message: message.into(),
        }
    }

    pub fn info(code: LoadIssueCode, object_index: usize, message: impl Into<String>) -> Self {
        Self {
            severity: LoadSeverity::Info,
            code,
            object_index,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            LoadSeverity::Warning => "warning",
            LoadSeverity::Info => "info",
        };
        write!(
            f,
            "[{}] {:?} (object {}): {}",
            severity, self.code, self.object_index, self.message
        )
    }
}

/// Severity level for load issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSeverity {
    /// The object was dropped or changed.
    Warning,
    /// Something was kept but not interpreted.
    Info,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadIssueCode {
    /// The type tag is not one of box/spline/boundary/polygon; object dropped.
    UnknownShapeType,
    /// The geometry does not match the type's point layout; object dropped.
    MalformedShape,
    /// The id was already used by an earlier object; a fresh id was assigned.
    DuplicateShapeId,
    /// The id is `u64::MAX`, which leaves no successor; a fresh id was assigned.
    ReservedShapeId,
    /// No fresh id was left for an object that needed one; object dropped.
    ShapeIdsExhausted,
    /// The verification result could not be decoded; it was dropped.
    InvalidVerificationResult,
    /// Attribute keys outside the shape type's taxonomy; kept verbatim.
    UntypedAttribute,
}
