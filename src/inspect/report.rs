//! Review progress report types and terminal formatting.

use serde::Serialize;
use std::fmt;

use crate::ir::ShapeKind;
use crate::review::ErrorCode;

/// Review progress over a whole label file.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub summary: SummarySection,
    /// Shape counts per kind, in [`ShapeKind::ALL`] order.
    pub kinds: Vec<KindCount>,
    /// Shape counts per verdict, in [`ErrorCode::ALL`] order, zeros included.
    pub verdicts: Vec<VerdictCount>,
    /// One row per image, in review order.
    pub images: Vec<ImageProgress>,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Summary counts for the label file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    pub images: usize,
    /// Shapes that load; dropped objects are not counted.
    pub shapes: usize,
    /// Shapes with a verdict other than Untagged.
    pub reviewed: usize,
    /// Shapes flagged Untagged.
    pub untagged: usize,
    /// Shapes without any verdict.
    pub unreviewed: usize,
    /// Objects that would be dropped on load.
    pub dropped: usize,
    /// Images where every shape is reviewed.
    pub completed_images: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct KindCount {
    pub kind: ShapeKind,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct VerdictCount {
    pub error_code: ErrorCode,
    pub count: usize,
}

/// Progress of a single image.
#[derive(Clone, Debug, Serialize)]
pub struct ImageProgress {
    pub name: String,
    pub shapes: usize,
    pub reviewed: usize,
    pub dropped: usize,
}

impl ImageProgress {
    pub fn is_complete(&self) -> bool {
        self.reviewed == self.shapes
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Review Progress Report")?;
        writeln!(f, "======================")?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_kinds(f)?;
        writeln!(f)?;
        self.fmt_verdicts(f)?;
        writeln!(f)?;
        self.fmt_images(f)?;

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "Summary")?;
        writeln!(f, "  Images:      {:>8}", format_number(s.images))?;
        writeln!(f, "  Shapes:      {:>8}", format_number(s.shapes))?;
        writeln!(
            f,
            "  Reviewed:    {:>8}  ({})",
            format_number(s.reviewed),
            fmt_percent(s.reviewed, s.shapes)
        )?;
        writeln!(f, "  Untagged:    {:>8}", format_number(s.untagged))?;
        writeln!(f, "  Unreviewed:  {:>8}", format_number(s.unreviewed))?;
        if s.dropped > 0 {
            writeln!(f, "  Dropped:     {:>8}  (not loadable)", format_number(s.dropped))?;
        }
        writeln!(
            f,
            "  Completed:   {:>8} of {} image(s)",
            format_number(s.completed_images),
            format_number(s.images)
        )?;

        Ok(())
    }

    fn fmt_kinds(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape types")?;
        let max = self.kinds.iter().map(|k| k.count).max().unwrap_or(0);
        for entry in &self.kinds {
            writeln!(
                f,
                "  {:<16} {:>7}  {}",
                entry.kind.as_str(),
                format_number(entry.count),
                render_bar(entry.count, max, self.bar_width)
            )?;
        }
        Ok(())
    }

    fn fmt_verdicts(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verdicts")?;
        let max = self.verdicts.iter().map(|v| v.count).max().unwrap_or(0);
        for entry in &self.verdicts {
            writeln!(
                f,
                "  {:<16} {:>7} {:>6}  {}",
                entry.error_code.as_str(),
                format_number(entry.count),
                fmt_percent(entry.count, self.summary.shapes),
                render_bar(entry.count, max, self.bar_width)
            )?;
        }
        Ok(())
    }

    fn fmt_images(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Images")?;
        if self.images.is_empty() {
            return writeln!(f, "  No images found.");
        }
        for image in &self.images {
            let mark = if image.is_complete() { "✓" } else { " " };
            write!(
                f,
                "  {} {:<24} {:>5} / {:<5}",
                mark,
                truncate_label(&image.name, 24),
                image.reviewed,
                image.shapes
            )?;
            if image.dropped > 0 {
                write!(f, "  ⚠ {} dropped", image.dropped)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a name to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
