//! Live document model behind an editing surface.
//!
//! [`LiveDocument`] is the peer-side copy of a document that the visual editor displays. The
//! surface reports raw edits ([`EditEvent`] plus the resulting text) and the model keeps markers,
//! invisible markers and marker annotations in step with the text. Whole documents pushed from
//! the other side replace the model wholesale, with the selection and invisible markers carried
//! across the text change.
//!
//! # Example
//!
//! ```rust
//! use docsync_core::{
//!     DocumentSnapshot, EditEvent, LiveDocument, Marker, MarkerKind, OnTextChange, Position,
//!     Range,
//! };
//!
//! let mut live = LiveDocument::new();
//! live.set_document(DocumentSnapshot::from_text("hello world").with_additional_marker(
//!     Marker::new("m1", Range::new(0, 6, 0, 11), "hl", MarkerKind::Range, false, OnTextChange::Adjust),
//! ));
//!
//! // The user types ">> " at the start of the row.
//! let change = live.apply_edit(&EditEvent::insertion(Position::new(0, 0), ">> "), ">> hello world");
//! assert!(change.text_changed);
//! assert_eq!(change.moved.len(), 1);
//! assert_eq!(live.document().markers().values().next().map(|m| m.range), Some(Range::new(0, 9, 0, 14)));
//! ```

use crate::adjust::{EditEvent, TextAdjuster, adjust_markers, adjust_range, clamp_caret};
use crate::annotation::RenderedAnnotation;
use crate::config::{DiffOptions, SyncConfig};
use crate::marker::{MarkerId, OnTextChange};
use crate::range::{Range, TextRange};
use crate::snapshot::{DocumentSnapshot, MarkerMap};
use ropey::Rope;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an invisible marker, unique within one [`LiveDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvisibleMarkerId(u64);

impl fmt::Display for InvisibleMarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a surface operation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceChange {
    /// Markers whose range changed.
    pub moved: Vec<MarkerId>,
    /// Markers that were dropped.
    pub removed: Vec<MarkerId>,
    /// Whether the text changed.
    pub text_changed: bool,
}

impl SurfaceChange {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        !self.text_changed && self.moved.is_empty() && self.removed.is_empty()
    }
}

/// Peer-side live copy of a document.
#[derive(Debug, Clone, Default)]
pub struct LiveDocument {
    doc: DocumentSnapshot,
    selection: Range,
    focused: bool,
    invisible: BTreeMap<InvisibleMarkerId, Range>,
    latest_invisible: u64,
    diff: DiffOptions,
}

impl LiveDocument {
    /// An empty document with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty document using `config`'s diff options.
    pub fn with_config(config: &SyncConfig) -> Self {
        Self {
            diff: config.diff,
            ..Self::default()
        }
    }

    /// The current document.
    pub fn document(&self) -> &DocumentSnapshot {
        &self.doc
    }

    /// The current text.
    pub fn text(&self) -> String {
        self.doc.text()
    }

    /// The current markers.
    pub fn markers(&self) -> &MarkerMap {
        self.doc.markers()
    }

    /// The current selection.
    pub fn selection(&self) -> Range {
        self.selection
    }

    /// The current selection resolved against the text.
    pub fn text_selection(&self) -> TextRange {
        TextRange::from_range(self.doc.rope(), self.selection)
    }

    /// Record the selection reported by the surface. Returns whether it changed.
    pub fn set_selection(&mut self, selection: Range) -> bool {
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        true
    }

    /// Whether the surface has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Record a focus change. Returns whether it changed.
    pub fn set_focused(&mut self, focused: bool) -> bool {
        if focused == self.focused {
            return false;
        }
        self.focused = focused;
        true
    }

    /// Process a raw edit reported by the surface.
    ///
    /// `new_text` is the full text after the edit. Nothing happens when it equals the current
    /// text.
    pub fn apply_edit(&mut self, event: &EditEvent, new_text: &str) -> SurfaceChange {
        if self.doc.has_text(new_text) {
            return SurfaceChange::default();
        }

        let outcome = adjust_markers(self.doc.markers(), event);
        for range in self.invisible.values_mut() {
            if let Some(moved) = adjust_range(*range, event) {
                *range = moved;
            }
        }

        self.doc = self
            .doc
            .with_text(new_text)
            .with_markers(outcome.markers);

        tracing::trace!(
            target: "docsync.surface",
            action = event.action.as_str(),
            range = %event.range,
            moved = outcome.moved.len(),
            removed = outcome.removed.len(),
            "applied surface edit"
        );

        SurfaceChange {
            moved: outcome.moved,
            removed: outcome.removed,
            text_changed: true,
        }
    }

    /// Install a whole document. Returns `false` (and does nothing) when `doc` equals the
    /// current one.
    ///
    /// The selection and invisible markers are carried across the text change; markers and
    /// annotations are taken from `doc` as they are.
    pub fn set_document(&mut self, doc: DocumentSnapshot) -> bool {
        if self.doc == doc {
            return false;
        }

        self.replace_text(doc.rope().clone());
        self.doc = doc;

        tracing::debug!(
            target: "docsync.surface",
            chars = self.doc.char_count(),
            markers = self.doc.markers().len(),
            "installed document"
        );
        true
    }

    /// Replace the text, carrying [`OnTextChange::Adjust`] markers across the change.
    ///
    /// [`OnTextChange::Remove`] markers are kept as they are. Caret-like markers are clamped
    /// back to caret shape; adjusted markers that end up empty or backwards are dropped.
    pub fn set_text_and_adjust(&mut self, text: &str) -> SurfaceChange {
        if self.doc.has_text(text) {
            return SurfaceChange::default();
        }

        let old_text = self.doc.text();
        let adjuster = TextAdjuster::new(&old_text, text, &self.diff);

        let mut change = SurfaceChange {
            text_changed: true,
            ..SurfaceChange::default()
        };
        let mut markers = MarkerMap::new();
        for (id, marker) in self.doc.markers() {
            if marker.on_text_change == OnTextChange::Remove {
                markers.insert(id.clone(), marker.clone());
                continue;
            }
            let range = clamp_caret(marker.kind, adjuster.adjust(marker.range));
            let moved = marker.with_range(range);
            if !moved.is_valid() {
                change.removed.push(id.clone());
            } else {
                if moved.range != marker.range {
                    change.moved.push(id.clone());
                }
                markers.insert(id.clone(), moved);
            }
        }

        self.carry_across(&adjuster);
        self.doc = self.doc.with_text(text).with_markers(markers);
        change
    }

    /// Add an invisible marker: a range that follows edits but is never rendered and has no
    /// edit policy.
    pub fn add_invisible_marker(&mut self, range: Range) -> InvisibleMarkerId {
        self.latest_invisible += 1;
        let id = InvisibleMarkerId(self.latest_invisible);
        self.invisible.insert(id, range);
        id
    }

    /// Remove an invisible marker, returning its last range.
    pub fn remove_invisible_marker(&mut self, id: InvisibleMarkerId) -> Option<Range> {
        self.invisible.remove(&id)
    }

    /// Current range of an invisible marker.
    pub fn invisible_marker(&self, id: InvisibleMarkerId) -> Option<Range> {
        self.invisible.get(&id).copied()
    }

    /// Delete the text covered by an invisible marker.
    ///
    /// Unknown ids and empty ranges change nothing.
    pub fn remove_contents_of_invisible_marker(&mut self, id: InvisibleMarkerId) -> SurfaceChange {
        let Some(range) = self.invisible_marker(id) else {
            return SurfaceChange::default();
        };
        if range.is_zero_length() {
            return SurfaceChange::default();
        }

        let covered = TextRange::from_range(self.doc.rope(), range.normalized());
        let mut text = self.doc.rope().clone();
        text.remove(covered.start_offset()..covered.end_offset());
        self.set_text_and_adjust(&text.to_string())
    }

    /// Annotations to draw: marker annotations on their marker's start row, then row
    /// annotations. Annotations of markers that no longer exist are skipped.
    pub fn rendered_annotations(&self) -> Vec<RenderedAnnotation> {
        let by_marker = self
            .doc
            .marker_annotations()
            .iter()
            .filter_map(|a| {
                let marker = self.doc.marker(&a.marker_id)?;
                Some(RenderedAnnotation {
                    row: marker.range.start.row,
                    annotation: a.annotation.clone(),
                    marker_id: Some(a.marker_id.clone()),
                })
            });
        let by_row = self
            .doc
            .row_annotations()
            .iter()
            .map(|a| RenderedAnnotation {
                row: a.row,
                annotation: a.annotation.clone(),
                marker_id: None,
            });
        by_marker.chain(by_row).collect()
    }

    fn replace_text(&mut self, text: Rope) {
        if self.doc.rope() == &text {
            return;
        }
        let adjuster = TextAdjuster::new(&self.doc.text(), &text.to_string(), &self.diff);
        self.carry_across(&adjuster);
    }

    fn carry_across(&mut self, adjuster: &TextAdjuster) {
        self.selection = adjuster.adjust(self.selection);
        for range in self.invisible.values_mut() {
            *range = adjuster.adjust(*range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::{EditAction, EditEvent};
    use crate::annotation::{Annotation, MarkerAnnotation, RowAnnotation, Severity};
    use crate::marker::{Marker, MarkerKind};
    use crate::range::Position;

    fn marker(id: &str, range: Range, policy: OnTextChange) -> Marker {
        Marker::new(id, range, "hl", MarkerKind::Range, false, policy)
    }

    #[test]
    fn test_unchanged_text_is_ignored() {
        let mut live = LiveDocument::new();
        live.set_document(DocumentSnapshot::from_text("abc"));
        let change = live.apply_edit(
            &EditEvent::new(EditAction::InsertText, Range::new(0, 0, 0, 1)),
            "abc",
        );
        assert!(change.is_empty());
    }

    #[test]
    fn test_set_document_short_circuits() {
        let mut live = LiveDocument::new();
        let doc = DocumentSnapshot::from_text("abc");
        assert!(!live.set_document(DocumentSnapshot::new()));
        assert!(live.set_document(doc.clone()));
        assert!(!live.set_document(doc.clone()));

        live.apply_edit(&EditEvent::insertion(Position::new(0, 3), "d"), "abcd");
        assert!(!live.set_document(live.document().clone()));
        assert!(live.set_document(doc));
        assert_eq!(live.text(), "abc");
    }

    #[test]
    fn test_text_adjust_keeps_cursor_markers_caret_shaped() {
        let cursor = Marker::new(
            "cur",
            Range::new(0, 2, 0, 3),
            "caret",
            MarkerKind::Cursor,
            false,
            OnTextChange::Adjust,
        );
        let doc = DocumentSnapshot::from_text("abcdef").with_additional_marker(cursor);

        let mut typed = LiveDocument::new();
        typed.set_document(doc.clone());
        typed.apply_edit(&EditEvent::insertion(Position::new(0, 3), "XYZ"), "abcXYZdef");

        let mut replaced = LiveDocument::new();
        replaced.set_document(doc);
        let change = replaced.set_text_and_adjust("abcXYZdef");

        let id = MarkerId::from("cur");
        assert_eq!(change.moved, vec![id.clone()]);
        assert_eq!(
            replaced.markers().get(&id).map(|m| m.range),
            Some(Range::new(0, 6, 0, 7))
        );
        assert_eq!(replaced.markers(), typed.markers());
    }

    #[test]
    fn test_selection_follows_document_replacement() {
        let mut live = LiveDocument::new();
        live.set_document(DocumentSnapshot::from_text("world"));
        live.set_selection(Range::new(0, 0, 0, 5));
        live.set_document(DocumentSnapshot::from_text("hello world"));
        assert_eq!(live.selection(), Range::new(0, 0, 0, 11));
        assert_eq!(live.text_selection().len(), 11);
    }

    #[test]
    fn test_invisible_markers_follow_edits() {
        let mut live = LiveDocument::new();
        live.set_document(DocumentSnapshot::from_text("abc def"));
        let first = live.add_invisible_marker(Range::new(0, 4, 0, 7));
        let second = live.add_invisible_marker(Range::new(0, 0, 0, 0));
        assert_ne!(first, second);

        live.apply_edit(&EditEvent::insertion(Position::new(0, 0), "xx "), "xx abc def");
        assert_eq!(live.invisible_marker(first), Some(Range::new(0, 7, 0, 10)));
        // Zero-length ranges are kept: invisible markers are never validated.
        assert_eq!(live.invisible_marker(second), Some(Range::new(0, 0, 0, 3)));

        assert_eq!(live.remove_invisible_marker(second), Some(Range::new(0, 0, 0, 3)));
        assert_eq!(live.invisible_marker(second), None);
    }

    #[test]
    fn test_remove_contents_of_invisible_marker() {
        let mut live = LiveDocument::new();
        live.set_document(
            DocumentSnapshot::from_text("keep [drop] keep").with_additional_marker(marker(
                "tail",
                Range::new(0, 12, 0, 16),
                OnTextChange::Adjust,
            )),
        );
        let id = live.add_invisible_marker(Range::new(0, 5, 0, 11));
        let change = live.remove_contents_of_invisible_marker(id);

        assert!(change.text_changed);
        assert_eq!(live.text(), "keep  keep");
        assert_eq!(live.invisible_marker(id), Some(Range::new(0, 5, 0, 5)));
        assert_eq!(
            live.markers().get(&MarkerId::from("tail")).map(|m| m.range),
            Some(Range::new(0, 6, 0, 10))
        );
    }

    #[test]
    fn test_set_text_and_adjust_keeps_remove_markers() {
        let mut live = LiveDocument::new();
        live.set_document(
            DocumentSnapshot::from_text("0123456789")
                .with_additional_marker(marker("adj", Range::new(0, 4, 0, 6), OnTextChange::Adjust))
                .with_additional_marker(marker("rem", Range::new(0, 4, 0, 6), OnTextChange::Remove)),
        );
        let change = live.set_text_and_adjust("ab0123456789");
        assert_eq!(change.moved, vec![MarkerId::from("adj")]);
        assert_eq!(
            live.markers().get(&MarkerId::from("adj")).map(|m| m.range),
            Some(Range::new(0, 6, 0, 8))
        );
        assert_eq!(
            live.markers().get(&MarkerId::from("rem")).map(|m| m.range),
            Some(Range::new(0, 4, 0, 6))
        );
    }

    #[test]
    fn test_rendered_annotations_resolve_marker_rows() {
        let mut live = LiveDocument::new();
        live.set_document(
            DocumentSnapshot::from_text("a\nb\nc")
                .with_additional_marker(marker("m1", Range::new(1, 0, 1, 1), OnTextChange::Adjust))
                .with_additional_marker_annotation(MarkerAnnotation::new(
                    "m1",
                    Annotation::new(Severity::Error, "on marker"),
                ))
                .with_additional_marker_annotation(MarkerAnnotation::new(
                    "gone",
                    Annotation::new(Severity::Error, "orphan"),
                ))
                .with_additional_row_annotation(RowAnnotation::new(
                    2,
                    Annotation::new(Severity::Info, "on row"),
                )),
        );

        live.apply_edit(&EditEvent::insertion(Position::new(0, 0), "\n"), "\na\nb\nc");

        let rendered = live.rendered_annotations();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].row, 2);
        assert_eq!(rendered[0].marker_id, Some(MarkerId::from("m1")));
        assert_eq!(rendered[1].row, 2);
        assert_eq!(rendered[1].marker_id, None);
        // The orphan stays in the model.
        assert_eq!(live.document().marker_annotations().len(), 2);
    }
}
