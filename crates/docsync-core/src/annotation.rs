//! Annotation data model.
//!
//! Annotations are severity/message pairs shown in the gutter. They are attached either to a
//! fixed row ([`RowAnnotation`]) or to a marker ([`MarkerAnnotation`]), in which case they follow
//! the marker's start row as the text is edited.

use crate::marker::MarkerId;

/// Annotation severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Error annotations.
    Error,
    /// Warning annotations.
    Warning,
    /// Informational annotations.
    Info,
}

impl Severity {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Parse a name produced by [`Severity::as_str`].
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// A single annotation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Annotation {
    /// Severity.
    pub severity: Severity,
    /// Message text.
    pub message: String,
}

impl Annotation {
    /// Create a new annotation.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// An annotation pinned to a row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowAnnotation {
    /// Zero-based row.
    pub row: usize,
    /// The annotation.
    pub annotation: Annotation,
}

impl RowAnnotation {
    /// Create a row annotation.
    pub fn new(row: usize, annotation: Annotation) -> Self {
        Self { row, annotation }
    }
}

/// An annotation positioned by the start row of a marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerAnnotation {
    /// Owning marker.
    pub marker_id: MarkerId,
    /// The annotation.
    pub annotation: Annotation,
}

impl MarkerAnnotation {
    /// Create a marker annotation.
    pub fn new(marker_id: impl Into<MarkerId>, annotation: Annotation) -> Self {
        Self {
            marker_id: marker_id.into(),
            annotation,
        }
    }
}

/// An annotation resolved to the row it should be drawn on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderedAnnotation {
    /// Row to draw on.
    pub row: usize,
    /// The annotation.
    pub annotation: Annotation,
    /// Owning marker, for marker annotations.
    pub marker_id: Option<MarkerId>,
}
