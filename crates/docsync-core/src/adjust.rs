//! Range adjustment.
//!
//! Recomputes ranges after a single edit so they keep covering the same text. An edit is an
//! [`EditEvent`]: for insertions its range spans the inserted text in post-insert coordinates;
//! for removals it spans the removed text in pre-removal coordinates.
//!
//! Boundary policy for insertions: an insertion exactly at a range's start does not move the
//! start, while an insertion exactly at its end pushes the end forward. Text typed at either
//! edge of a range therefore ends up inside it.
//!
//! Markers additionally go through their [`OnTextChange`] policy, the caret clamps for
//! [`MarkerKind::Cursor`] / [`MarkerKind::CursorRow`], and validation.

use crate::config::DiffOptions;
use crate::delta::EditOp;
use crate::diff::diff_text;
use crate::line_index::{LineIndex, end_position_after};
use crate::marker::{Marker, MarkerId, MarkerKind, OnTextChange};
use crate::range::{Position, Range};
use crate::snapshot::MarkerMap;
use ropey::Rope;

/// Kind of raw edit reported by the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAction {
    /// Text inserted within a row.
    InsertText,
    /// Text containing line breaks inserted.
    InsertLines,
    /// Text removed within a row.
    RemoveText,
    /// Text spanning line breaks removed.
    RemoveLines,
}

impl EditAction {
    /// Whether the action inserts text.
    pub fn is_insert(self) -> bool {
        matches!(self, Self::InsertText | Self::InsertLines)
    }

    /// Stable camelCase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsertText => "insertText",
            Self::InsertLines => "insertLines",
            Self::RemoveText => "removeText",
            Self::RemoveLines => "removeLines",
        }
    }
}

/// A raw edit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditEvent {
    /// What happened.
    pub action: EditAction,
    /// Affected region (see module docs for which coordinates).
    pub range: Range,
}

impl EditEvent {
    /// Create an event.
    pub fn new(action: EditAction, range: Range) -> Self {
        Self { action, range }
    }

    /// Insertion of `text` at `at`.
    pub fn insertion(at: Position, text: &str) -> Self {
        let end = end_position_after(at, text);
        let action = if end.row > at.row {
            EditAction::InsertLines
        } else {
            EditAction::InsertText
        };
        Self::new(action, Range::from_positions(at, end))
    }

    /// Removal of the text between `start` and `end`.
    pub fn removal(start: Position, end: Position) -> Self {
        let action = if end.row > start.row {
            EditAction::RemoveLines
        } else {
            EditAction::RemoveText
        };
        Self::new(action, Range::from_positions(start, end))
    }

    /// Describe `op` as an edit event against `text`, the text before `op` applies.
    ///
    /// Offsets past the end are clamped.
    pub fn from_op(op: &EditOp, text: &Rope) -> Self {
        let index = LineIndex::from_rope(text);
        match op {
            EditOp::Insert { offset, text } => {
                Self::insertion(index.char_offset_to_position(*offset), text)
            }
            EditOp::Delete { offset, len } => Self::removal(
                index.char_offset_to_position(*offset),
                index.char_offset_to_position(offset.saturating_add(*len)),
            ),
        }
    }

    /// Whether the edit touches the normalized `range`.
    ///
    /// Insertions touch it when they land within the closed `[start, end]`; removals when they
    /// overlap the half-open `[start, end)`. Removals next to the range only shift it.
    pub fn touches(&self, range: Range) -> bool {
        let range = range.normalized();
        let edit = self.range.normalized();
        if self.action.is_insert() {
            range.start <= edit.start && edit.start <= range.end
        } else {
            edit.start < range.end && edit.end > range.start
        }
    }
}

fn shift_on_insert(point: Position, start: Position, end: Position, inclusive: bool) -> Position {
    if point.row > start.row {
        Position::new(point.row + (end.row - start.row), point.column)
    } else if point.row == start.row
        && (point.column > start.column || (inclusive && point.column == start.column))
    {
        Position::new(end.row, end.column + (point.column - start.column))
    } else {
        point
    }
}

fn shift_on_remove(point: Position, start: Position, end: Position) -> Position {
    if point <= start {
        point
    } else if point <= end {
        start
    } else if point.row == end.row {
        Position::new(start.row, start.column + (point.column - end.column))
    } else {
        Position::new(point.row - (end.row - start.row), point.column)
    }
}

fn reorient(original: Range, start: Position, end: Position) -> Range {
    if original.is_backwards() {
        Range::from_positions(end, start)
    } else {
        Range::from_positions(start, end)
    }
}

/// Move `range` for an insertion spanning `start..end` (post-insert coordinates).
///
/// Returns `None` when the range is not affected. Backwards ranges stay backwards.
pub fn adjust_on_insert(range: Range, start: Position, end: Position) -> Option<Range> {
    if end <= start {
        return None;
    }

    let normalized = range.normalized();
    if start.row > normalized.end.row {
        return None;
    }

    let lo = shift_on_insert(normalized.start, start, end, false);
    let hi = shift_on_insert(normalized.end, start, end, true);
    if lo == normalized.start && hi == normalized.end {
        return None;
    }
    Some(reorient(range, lo, hi))
}

/// Move `range` for a removal of `start..end` (pre-removal coordinates).
///
/// Returns `None` when neither endpoint moved.
pub fn adjust_on_remove(range: Range, start: Position, end: Position) -> Option<Range> {
    if end <= start {
        return None;
    }

    let normalized = range.normalized();
    let lo = shift_on_remove(normalized.start, start, end);
    let hi = shift_on_remove(normalized.end, start, end);
    if lo == normalized.start && hi == normalized.end {
        return None;
    }
    Some(reorient(range, lo, hi))
}

/// Move `range` for `event`. Returns `None` when the range is not affected.
pub fn adjust_range(range: Range, event: &EditEvent) -> Option<Range> {
    let edit = event.range.normalized();
    if event.action.is_insert() {
        adjust_on_insert(range, edit.start, edit.end)
    } else {
        adjust_on_remove(range, edit.start, edit.end)
    }
}

/// Keep caret-like markers caret-shaped after they moved.
///
/// A [`MarkerKind::CursorRow`] never spans more than two rows; a [`MarkerKind::Cursor`] always
/// covers exactly one character cell, anchored at the range's end.
pub fn clamp_caret(kind: MarkerKind, range: Range) -> Range {
    match kind {
        MarkerKind::CursorRow if range.end.row > range.start.row + 1 => {
            Range::new(range.start.row, 0, range.start.row + 1, 0)
        }
        MarkerKind::Cursor
            if range.start.row != range.end.row || range.end.column > range.start.column + 1 =>
        {
            Range::new(
                range.end.row,
                range.end.column,
                range.end.row,
                range.end.column + 1,
            )
        }
        MarkerKind::Range | MarkerKind::Line | MarkerKind::Cursor | MarkerKind::CursorRow => range,
    }
}

/// What an edit did to one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerAdjustment {
    /// Not affected.
    Unchanged,
    /// Moved to a new, valid range.
    Moved(Marker),
    /// Dropped: either by its [`OnTextChange::Remove`] policy or because it became invalid.
    Removed,
}

/// Apply `event` to one marker.
pub fn adjust_marker(marker: &Marker, event: &EditEvent) -> MarkerAdjustment {
    if marker.on_text_change == OnTextChange::Remove && event.touches(marker.range) {
        return MarkerAdjustment::Removed;
    }

    let Some(range) = adjust_range(marker.range, event) else {
        return MarkerAdjustment::Unchanged;
    };

    let moved = marker.with_range(clamp_caret(marker.kind, range));
    if moved.is_valid() {
        MarkerAdjustment::Moved(moved)
    } else {
        MarkerAdjustment::Removed
    }
}

/// Result of [`adjust_markers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustOutcome {
    /// The marker map after the edit.
    pub markers: MarkerMap,
    /// Ids of markers whose range changed.
    pub moved: Vec<MarkerId>,
    /// Ids of markers that were dropped.
    pub removed: Vec<MarkerId>,
}

impl AdjustOutcome {
    /// Whether any marker moved or was dropped.
    pub fn is_changed(&self) -> bool {
        !self.moved.is_empty() || !self.removed.is_empty()
    }
}

/// Apply `event` to every marker in `markers`.
pub fn adjust_markers(markers: &MarkerMap, event: &EditEvent) -> AdjustOutcome {
    let mut outcome = AdjustOutcome::default();

    for (id, marker) in markers {
        match adjust_marker(marker, event) {
            MarkerAdjustment::Unchanged => {
                outcome.markers.insert(id.clone(), marker.clone());
            }
            MarkerAdjustment::Moved(moved) => {
                outcome.moved.push(id.clone());
                outcome.markers.insert(id.clone(), moved);
            }
            MarkerAdjustment::Removed => outcome.removed.push(id.clone()),
        }
    }

    tracing::trace!(
        target: "docsync.surface",
        action = event.action.as_str(),
        range = %event.range,
        moved = outcome.moved.len(),
        removed = outcome.removed.len(),
        "adjusted markers"
    );
    outcome
}

/// Carries ranges through a whole-text replacement.
///
/// The old and new texts are diffed and every resulting operation is replayed as an
/// [`EditEvent`], so ranges move exactly as if the replacement had been typed.
#[derive(Debug, Clone, Default)]
pub struct TextAdjuster {
    events: Vec<EditEvent>,
}

impl TextAdjuster {
    /// Prepare an adjuster for replacing `old` with `new`.
    pub fn new(old: &str, new: &str, options: &DiffOptions) -> Self {
        let mut text = Rope::from_str(old);
        let mut events = Vec::new();

        for op in diff_text(old, new, options) {
            events.push(EditEvent::from_op(&op, &text));
            match &op {
                EditOp::Insert { offset, text: inserted } => text.insert(*offset, inserted),
                EditOp::Delete { offset, len } => text.remove(*offset..*offset + *len),
            }
        }

        Self { events }
    }

    /// Whether the replacement changes nothing.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    /// Carry `range` through every edit.
    pub fn adjust(&self, range: Range) -> Range {
        self.events
            .iter()
            .fold(range, |range, event| adjust_range(range, event).unwrap_or(range))
    }
}
