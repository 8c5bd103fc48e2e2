//! Marker data model.
//!
//! Markers are named, styled sub-ranges of the document that track edits to the text. They
//! are owned by a [`DocumentSnapshot`](crate::DocumentSnapshot) and keyed by [`MarkerId`].

use crate::range::Range;
use std::fmt;
use std::sync::Arc;

/// Identifier of a marker, unique within one document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(Arc<str>);

impl MarkerId {
    /// Create a marker id.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MarkerId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// How a marker is drawn, and which caret clamps apply to it after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// A plain text range.
    Range,
    /// Full-line highlight of the rows the range covers.
    Line,
    /// A caret-like marker covering a single character cell.
    Cursor,
    /// A caret-like marker highlighting the row it sits on.
    CursorRow,
}

impl MarkerKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Line => "line",
            Self::Cursor => "cursor",
            Self::CursorRow => "cursorRow",
        }
    }

    /// Parse a name produced by [`MarkerKind::as_str`].
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "range" | "text" => Some(Self::Range),
            "line" => Some(Self::Line),
            "cursor" => Some(Self::Cursor),
            "cursorRow" => Some(Self::CursorRow),
            _ => None,
        }
    }
}

/// What happens to a marker when an edit touches its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnTextChange {
    /// Recompute the range so it keeps covering the same text.
    Adjust,
    /// Drop the marker.
    Remove,
}

/// A single marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    /// Unique id within the document.
    pub id: MarkerId,
    /// Covered region.
    pub range: Range,
    /// Style class the surface renders the marker with.
    pub style_class: String,
    /// Marker kind.
    pub kind: MarkerKind,
    /// Render above other markers.
    pub in_front: bool,
    /// Edit policy.
    pub on_text_change: OnTextChange,
}

impl Marker {
    /// Create a marker.
    pub fn new(
        id: impl Into<MarkerId>,
        range: Range,
        style_class: impl Into<String>,
        kind: MarkerKind,
        in_front: bool,
        on_text_change: OnTextChange,
    ) -> Self {
        Self {
            id: id.into(),
            range,
            style_class: style_class.into(),
            kind,
            in_front,
            on_text_change,
        }
    }

    /// The same marker at a different position.
    pub fn with_range(&self, range: Range) -> Self {
        Self {
            range,
            ..self.clone()
        }
    }

    /// Whether the marker's range can still be rendered: non-empty and not backwards.
    pub fn is_valid(&self) -> bool {
        !self.range.is_zero_length() && !self.range.is_backwards()
    }
}

/// Generates marker ids of the form `{prefix}{n}`.
///
/// Each document or session owns its own generator, so ids are deterministic per instance.
#[derive(Debug, Clone)]
pub struct MarkerIdGenerator {
    prefix: String,
    latest: u64,
}

impl MarkerIdGenerator {
    /// Create a generator; the first id is `{prefix}1`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            latest: 0,
        }
    }

    /// Produce the next id.
    pub fn next_id(&mut self) -> MarkerId {
        self.latest += 1;
        MarkerId::from(format!("{}{}", self.prefix, self.latest))
    }
}
