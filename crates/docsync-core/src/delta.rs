//! Edit scripts.
//!
//! An [`EditScript`] is the unit exchanged between the two copies of a document: an ordered list
//! of character-offset operations plus optional full replacements of the marker map and the
//! annotation sets.
//!
//! Semantics:
//! - every operation's offset is a character offset (Unicode scalar values) in the text **as
//!   left by the previous operation**;
//! - a replacement payload that is `None` leaves the corresponding collection untouched;
//! - [`diff`] only includes a payload when that collection actually differs.
//!
//! ```rust
//! use docsync_core::{apply, diff, DocumentSnapshot};
//!
//! let a = DocumentSnapshot::from_text("hello world");
//! let b = DocumentSnapshot::from_text("hello, brave world");
//!
//! let script = diff(&a, &b);
//! assert!(!script.is_identity());
//! assert_eq!(apply(&script, &a).unwrap(), b);
//! ```

use crate::config::DiffOptions;
use crate::diff::diff_text;
use crate::error::ApplyError;
use crate::snapshot::{DocumentSnapshot, MarkerAnnotationSet, MarkerMap, RowAnnotationSet};
use ropey::Rope;
use std::sync::Arc;

/// A single text operation in character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Insert `text` before the character at `offset`.
    Insert {
        /// Insertion offset.
        offset: usize,
        /// Inserted text (may be empty).
        text: String,
    },
    /// Delete `len` characters starting at `offset`.
    Delete {
        /// First deleted character.
        offset: usize,
        /// Number of deleted characters (may be zero).
        len: usize,
    },
}

impl EditOp {
    /// An insertion.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            offset,
            text: text.into(),
        }
    }

    /// A deletion.
    pub fn delete(offset: usize, len: usize) -> Self {
        Self::Delete { offset, len }
    }

    /// Whether applying the operation changes any text.
    pub fn changes_text(&self) -> bool {
        match self {
            Self::Insert { text, .. } => !text.is_empty(),
            Self::Delete { len, .. } => *len > 0,
        }
    }

    /// Change in text length, in characters.
    pub fn char_delta(&self) -> isize {
        match self {
            Self::Insert { text, .. } => text.chars().count() as isize,
            Self::Delete { len, .. } => -(*len as isize),
        }
    }
}

/// An ordered list of operations plus optional marker/annotation replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<EditOp>,
    markers: Option<Arc<MarkerMap>>,
    row_annotations: Option<Arc<RowAnnotationSet>>,
    marker_annotations: Option<Arc<MarkerAnnotationSet>>,
}

impl EditScript {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// A script made of `ops` with no replacement payloads.
    pub fn from_ops(ops: Vec<EditOp>) -> Self {
        Self {
            ops,
            ..Self::default()
        }
    }

    /// Attach a full replacement of the marker map.
    pub fn with_markers(mut self, markers: MarkerMap) -> Self {
        self.markers = Some(Arc::new(markers));
        self
    }

    /// Attach a full replacement of the row-annotation set.
    pub fn with_row_annotations(mut self, annotations: RowAnnotationSet) -> Self {
        self.row_annotations = Some(Arc::new(annotations));
        self
    }

    /// Attach a full replacement of the marker-annotation set.
    pub fn with_marker_annotations(mut self, annotations: MarkerAnnotationSet) -> Self {
        self.marker_annotations = Some(Arc::new(annotations));
        self
    }

    /// Text operations, in application order.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Marker replacement, if any.
    pub fn markers(&self) -> Option<&MarkerMap> {
        self.markers.as_deref()
    }

    /// Row-annotation replacement, if any.
    pub fn row_annotations(&self) -> Option<&RowAnnotationSet> {
        self.row_annotations.as_deref()
    }

    /// Marker-annotation replacement, if any.
    pub fn marker_annotations(&self) -> Option<&MarkerAnnotationSet> {
        self.marker_annotations.as_deref()
    }

    /// Whether no operation changes text. Replacement payloads are not considered.
    pub fn is_identity(&self) -> bool {
        !self.ops.iter().any(EditOp::changes_text)
    }

    /// Whether the script has neither operations nor payloads.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
            && self.markers.is_none()
            && self.row_annotations.is_none()
            && self.marker_annotations.is_none()
    }

    /// Net change in text length, in characters.
    pub fn char_delta(&self) -> isize {
        self.ops.iter().map(EditOp::char_delta).sum()
    }

    /// Check every operation against the running length of a text that starts `len` characters
    /// long.
    pub fn validate(&self, len: usize) -> Result<(), ApplyError> {
        let mut len = len;
        for (index, op) in self.ops.iter().enumerate() {
            match op {
                EditOp::Insert { offset, text } => {
                    if *offset > len {
                        return Err(ApplyError::InsertOutOfBounds {
                            index,
                            offset: *offset,
                            len,
                        });
                    }
                    len += text.chars().count();
                }
                EditOp::Delete { offset, len: count } => {
                    let end = offset.saturating_add(*count);
                    if end > len {
                        return Err(ApplyError::DeleteOutOfBounds {
                            index,
                            offset: *offset,
                            end,
                            len,
                        });
                    }
                    len -= count;
                }
            }
        }
        Ok(())
    }

    /// Apply the text operations to `text`.
    ///
    /// The script is validated first, so on error `text` is untouched.
    pub fn apply_text(&self, text: &Rope) -> Result<Rope, ApplyError> {
        self.validate(text.len_chars())?;

        let mut out = text.clone();
        for op in &self.ops {
            match op {
                EditOp::Insert { offset, text } => {
                    if !text.is_empty() {
                        out.insert(*offset, text);
                    }
                }
                EditOp::Delete { offset, len } => {
                    if *len > 0 {
                        out.remove(*offset..*offset + *len);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Apply the whole script to `doc`.
    pub fn apply_to(&self, doc: &DocumentSnapshot) -> Result<DocumentSnapshot, ApplyError> {
        let text = self.apply_text(doc.rope())?;

        let mut next = doc.with_rope(text);
        if let Some(markers) = &self.markers {
            next = next.with_shared_markers(Arc::clone(markers));
        }
        if let Some(annotations) = &self.row_annotations {
            next = next.with_shared_row_annotations(Arc::clone(annotations));
        }
        if let Some(annotations) = &self.marker_annotations {
            next = next.with_shared_marker_annotations(Arc::clone(annotations));
        }

        tracing::trace!(
            target: "docsync.delta",
            ops = self.ops.len(),
            char_delta = self.char_delta(),
            markers_replaced = self.markers.is_some(),
            "applied edit script"
        );
        Ok(next)
    }
}

/// Compute the script that turns `older` into `newer`, with default [`DiffOptions`].
pub fn diff(older: &DocumentSnapshot, newer: &DocumentSnapshot) -> EditScript {
    diff_with(older, newer, &DiffOptions::default())
}

/// Compute the script that turns `older` into `newer`.
///
/// `apply(&diff_with(a, b, o), a) == Ok(b)` for every `a`, `b` and `o`.
pub fn diff_with(
    older: &DocumentSnapshot,
    newer: &DocumentSnapshot,
    options: &DiffOptions,
) -> EditScript {
    let ops = if older.rope() == newer.rope() {
        Vec::new()
    } else {
        diff_text(&older.text(), &newer.text(), options)
    };

    let mut script = EditScript::from_ops(ops);
    if older.markers() != newer.markers() {
        script.markers = Some(newer.shared_markers());
    }
    if older.row_annotations() != newer.row_annotations() {
        script.row_annotations = Some(newer.shared_row_annotations());
    }
    if older.marker_annotations() != newer.marker_annotations() {
        script.marker_annotations = Some(newer.shared_marker_annotations());
    }
    script
}

/// Apply `script` to `doc`. See [`EditScript::apply_to`].
pub fn apply(script: &EditScript, doc: &DocumentSnapshot) -> Result<DocumentSnapshot, ApplyError> {
    script.apply_to(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, RowAnnotation, Severity};
    use crate::marker::{Marker, MarkerKind, OnTextChange};
    use crate::range::Range;

    fn marker(id: &str) -> Marker {
        Marker::new(
            id,
            Range::new(0, 0, 0, 1),
            "hl",
            MarkerKind::Range,
            false,
            OnTextChange::Adjust,
        )
    }

    #[test]
    fn test_ops_apply_in_sequence() {
        let script = EditScript::from_ops(vec![
            EditOp::delete(0, 2),
            EditOp::insert(0, "XY"),
            EditOp::insert(5, "!"),
        ]);
        let doc = DocumentSnapshot::from_text("abcde");
        assert_eq!(apply(&script, &doc).unwrap().text(), "XYcde!");
        assert_eq!(script.char_delta(), 1);
    }

    #[test]
    fn test_validation_tracks_running_length() {
        let script = EditScript::from_ops(vec![EditOp::insert(3, "xx"), EditOp::delete(4, 1)]);
        assert_eq!(script.validate(3), Ok(()));
        assert_eq!(
            script.validate(2),
            Err(ApplyError::InsertOutOfBounds {
                index: 0,
                offset: 3,
                len: 2
            })
        );

        let script = EditScript::from_ops(vec![EditOp::delete(0, 1), EditOp::delete(2, 1)]);
        assert_eq!(
            script.validate(3),
            Err(ApplyError::DeleteOutOfBounds {
                index: 1,
                offset: 2,
                end: 3,
                len: 2
            })
        );
    }

    #[test]
    fn test_failed_apply_does_not_touch_input() {
        let doc = DocumentSnapshot::from_text("abc");
        let script = EditScript::from_ops(vec![EditOp::insert(1, "zz"), EditOp::delete(10, 1)]);
        assert!(apply(&script, &doc).is_err());
        assert_eq!(doc.text(), "abc");
    }

    #[test]
    fn test_identity() {
        assert!(EditScript::new().is_identity());
        assert!(EditScript::from_ops(vec![EditOp::insert(0, ""), EditOp::delete(0, 0)]).is_identity());
        assert!(!EditScript::from_ops(vec![EditOp::insert(0, "a")]).is_identity());

        let doc = DocumentSnapshot::from_text("same");
        let script = diff(&doc, &doc);
        assert!(script.is_identity());
        assert!(script.is_empty());
    }

    #[test]
    fn test_payloads_only_when_different() {
        let a = DocumentSnapshot::from_text("text");
        let b = a.with_additional_marker(marker("m1"));

        let script = diff(&a, &b);
        assert!(script.is_identity());
        assert!(script.markers().is_some());
        assert!(script.row_annotations().is_none());
        assert!(script.marker_annotations().is_none());
        assert_eq!(apply(&script, &a).unwrap(), b);
    }

    #[test]
    fn test_absent_payload_retains_collections() {
        let doc = DocumentSnapshot::from_text("abc")
            .with_additional_marker(marker("m1"))
            .with_additional_row_annotation(RowAnnotation::new(
                0,
                Annotation::new(Severity::Info, "note"),
            ));
        let script = EditScript::from_ops(vec![EditOp::insert(3, "d")]);
        let next = apply(&script, &doc).unwrap();
        assert_eq!(next.text(), "abcd");
        assert_eq!(next.markers(), doc.markers());
        assert_eq!(next.row_annotations(), doc.row_annotations());
    }

    #[test]
    fn test_same_script_on_different_marker_sets() {
        let older = DocumentSnapshot::from_text("one two");
        let newer = DocumentSnapshot::from_text("one three two");
        let script = diff(&older, &newer);

        let plain = apply(&script, &older).unwrap();
        let marked = apply(&script, &older.with_additional_marker(marker("m9"))).unwrap();
        assert_eq!(plain.text(), "one three two");
        assert_eq!(marked.text(), "one three two");
        assert_eq!(marked.markers().len(), 1);
    }
}
