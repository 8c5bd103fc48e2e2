//! Immutable document snapshots.
//!
//! A [`DocumentSnapshot`] aggregates the text, markers and annotations of a document. Every
//! `with*` method returns a new snapshot; untouched parts are shared with the original (the
//! text is a [`Rope`] whose clones share nodes, and the collections sit behind [`Arc`]s that are
//! only copied when written through).
//!
//! # Example
//!
//! ```rust
//! use docsync_core::{DocumentSnapshot, Marker, MarkerKind, OnTextChange, Range};
//!
//! let doc = DocumentSnapshot::from_text("hello\nworld");
//! let marked = doc.with_additional_marker(Marker::new(
//!     "m1",
//!     Range::new(1, 0, 1, 5),
//!     "highlight",
//!     MarkerKind::Range,
//!     false,
//!     OnTextChange::Adjust,
//! ));
//!
//! assert_eq!(doc.markers().len(), 0);
//! assert_eq!(marked.markers().len(), 1);
//! assert_eq!(marked.text(), "hello\nworld");
//! ```

use crate::annotation::{MarkerAnnotation, RowAnnotation};
use crate::line_index::LineIndex;
use crate::marker::{Marker, MarkerId};
use ropey::Rope;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Markers of a document, keyed by id.
pub type MarkerMap = BTreeMap<MarkerId, Marker>;
/// Row annotations of a document.
pub type RowAnnotationSet = BTreeSet<RowAnnotation>;
/// Marker annotations of a document.
pub type MarkerAnnotationSet = BTreeSet<MarkerAnnotation>;

/// An immutable document: text plus markers and annotations.
///
/// Equality is structural.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSnapshot {
    text: Rope,
    markers: Arc<MarkerMap>,
    row_annotations: Arc<RowAnnotationSet>,
    marker_annotations: Arc<MarkerAnnotationSet>,
}

impl DocumentSnapshot {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with the given text and nothing else.
    pub fn from_text(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
            ..Self::default()
        }
    }

    /// Assemble a snapshot from its parts.
    pub fn from_parts(
        text: Rope,
        markers: MarkerMap,
        row_annotations: RowAnnotationSet,
        marker_annotations: MarkerAnnotationSet,
    ) -> Self {
        Self {
            text,
            markers: Arc::new(markers),
            row_annotations: Arc::new(row_annotations),
            marker_annotations: Arc::new(marker_annotations),
        }
    }

    /// The full text as a string.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The text rope (cheap to clone).
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Whether the text equals `text`.
    pub fn has_text(&self, text: &str) -> bool {
        self.text == text
    }

    /// Text length in characters.
    pub fn char_count(&self) -> usize {
        self.text.len_chars()
    }

    /// Row/column index over the text.
    pub fn line_index(&self) -> LineIndex {
        LineIndex::from_rope(&self.text)
    }

    /// Markers by id.
    pub fn markers(&self) -> &MarkerMap {
        &self.markers
    }

    /// Look up a marker.
    pub fn marker(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.get(id)
    }

    /// Row annotations.
    pub fn row_annotations(&self) -> &RowAnnotationSet {
        &self.row_annotations
    }

    /// Marker annotations.
    pub fn marker_annotations(&self) -> &MarkerAnnotationSet {
        &self.marker_annotations
    }

    pub(crate) fn shared_markers(&self) -> Arc<MarkerMap> {
        Arc::clone(&self.markers)
    }

    pub(crate) fn shared_row_annotations(&self) -> Arc<RowAnnotationSet> {
        Arc::clone(&self.row_annotations)
    }

    pub(crate) fn shared_marker_annotations(&self) -> Arc<MarkerAnnotationSet> {
        Arc::clone(&self.marker_annotations)
    }

    /// Same markers and annotations, different text.
    pub fn with_text(&self, text: &str) -> Self {
        self.with_rope(Rope::from_str(text))
    }

    /// Same markers and annotations, different text rope.
    pub fn with_rope(&self, text: Rope) -> Self {
        Self {
            text,
            ..self.clone()
        }
    }

    /// Add a marker, replacing any marker with the same id.
    pub fn with_additional_marker(&self, marker: Marker) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.markers).insert(marker.id.clone(), marker);
        next
    }

    /// Remove a marker. Removing an unknown id returns an equal snapshot.
    pub fn without_marker(&self, id: &MarkerId) -> Self {
        if !self.markers.contains_key(id) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.markers).remove(id);
        next
    }

    /// Remove all markers.
    pub fn without_markers(&self) -> Self {
        self.with_markers(MarkerMap::new())
    }

    /// Replace the whole marker map.
    pub fn with_markers(&self, markers: MarkerMap) -> Self {
        self.with_shared_markers(Arc::new(markers))
    }

    pub(crate) fn with_shared_markers(&self, markers: Arc<MarkerMap>) -> Self {
        Self {
            markers,
            ..self.clone()
        }
    }

    /// Replace the whole marker-annotation set.
    pub fn with_marker_annotations(&self, annotations: MarkerAnnotationSet) -> Self {
        self.with_shared_marker_annotations(Arc::new(annotations))
    }

    pub(crate) fn with_shared_marker_annotations(
        &self,
        annotations: Arc<MarkerAnnotationSet>,
    ) -> Self {
        Self {
            marker_annotations: annotations,
            ..self.clone()
        }
    }

    /// Replace the whole row-annotation set.
    pub fn with_row_annotations(&self, annotations: RowAnnotationSet) -> Self {
        self.with_shared_row_annotations(Arc::new(annotations))
    }

    pub(crate) fn with_shared_row_annotations(&self, annotations: Arc<RowAnnotationSet>) -> Self {
        Self {
            row_annotations: annotations,
            ..self.clone()
        }
    }

    /// Add one marker annotation.
    pub fn with_additional_marker_annotation(&self, annotation: MarkerAnnotation) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.marker_annotations).insert(annotation);
        next
    }

    /// Add one row annotation.
    pub fn with_additional_row_annotation(&self, annotation: RowAnnotation) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.row_annotations).insert(annotation);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Severity};
    use crate::marker::{MarkerKind, OnTextChange};
    use crate::range::Range;

    fn marker(id: &str, range: Range) -> Marker {
        Marker::new(
            id,
            range,
            "hl",
            MarkerKind::Range,
            false,
            OnTextChange::Adjust,
        )
    }

    #[test]
    fn test_with_text_keeps_markers() {
        let doc = DocumentSnapshot::from_text("abc")
            .with_additional_marker(marker("a", Range::new(0, 0, 0, 1)));
        let next = doc.with_text("xyz");
        assert_eq!(next.text(), "xyz");
        assert_eq!(next.markers(), doc.markers());
        assert_eq!(doc.text(), "abc");
    }

    #[test]
    fn test_colliding_marker_id_replaces() {
        let doc = DocumentSnapshot::new()
            .with_additional_marker(marker("a", Range::new(0, 0, 0, 1)))
            .with_additional_marker(marker("a", Range::new(0, 3, 0, 4)));
        assert_eq!(doc.markers().len(), 1);
        assert_eq!(
            doc.marker(&MarkerId::from("a")).map(|m| m.range),
            Some(Range::new(0, 3, 0, 4))
        );
    }

    #[test]
    fn test_removing_unknown_marker_is_noop() {
        let doc = DocumentSnapshot::from_text("abc")
            .with_additional_marker(marker("a", Range::new(0, 0, 0, 1)));
        assert_eq!(doc.without_marker(&MarkerId::from("zzz")), doc);
        assert!(doc.without_marker(&MarkerId::from("a")).markers().is_empty());
        assert!(doc.without_markers().markers().is_empty());
    }

    #[test]
    fn test_unchanged_parts_are_shared() {
        let doc = DocumentSnapshot::from_text("abc")
            .with_additional_row_annotation(RowAnnotation::new(
                0,
                Annotation::new(Severity::Warning, "w"),
            ));
        let next = doc.with_additional_marker(marker("a", Range::new(0, 0, 0, 1)));
        assert!(Arc::ptr_eq(
            &doc.shared_row_annotations(),
            &next.shared_row_annotations()
        ));
        assert!(!Arc::ptr_eq(&doc.shared_markers(), &next.shared_markers()));
    }

    #[test]
    fn test_structural_equality() {
        let a = DocumentSnapshot::from_text("x\ny").with_additional_marker_annotation(
            MarkerAnnotation::new("m1", Annotation::new(Severity::Error, "bad")),
        );
        let b = DocumentSnapshot::from_text("x\ny").with_marker_annotations(
            [MarkerAnnotation::new(
                "m1",
                Annotation::new(Severity::Error, "bad"),
            )]
            .into_iter()
            .collect(),
        );
        assert_eq!(a, b);
        assert_ne!(a, b.with_text("x\nz"));
    }
}
