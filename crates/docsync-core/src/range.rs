//! Positions and ranges.
//!
//! A [`Position`] is a `(row, column)` pair. A [`Range`] is a pair of positions that may be
//! backwards (start after end), which is how a right-to-left selection is reported.
//! [`TextRange`] pins a range to one specific text so that its row/column view and its
//! character-offset view always agree.

use crate::line_index::LineIndex;
use ropey::Rope;
use std::cmp::Ordering;
use std::fmt;

/// Position coordinates (row and column numbers)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column in characters within the row.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// A region of text between two positions.
///
/// `end` is exclusive once the range is normalized. The range itself does not enforce
/// `start <= end`; use [`Range::normalized`] before doing arithmetic on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    /// Start (anchor) position.
    pub start: Position,
    /// End (active) position.
    pub end: Position,
}

impl Range {
    /// Create a range from row/column pairs.
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start: Position::new(start_row, start_col),
            end: Position::new(end_row, end_col),
        }
    }

    /// Create a range from two positions.
    pub fn from_positions(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-length range at `position`.
    pub fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Whether `start == end`.
    pub fn is_zero_length(&self) -> bool {
        self.start == self.end
    }

    /// Whether `start` comes after `end`.
    pub fn is_backwards(&self) -> bool {
        self.start > self.end
    }

    /// The same region with `start <= end`.
    pub fn normalized(self) -> Self {
        if self.is_backwards() {
            Self {
                start: self.end,
                end: self.start,
            }
        } else {
            self
        }
    }

    /// Whether `(row, column)` lies inside the normalized half-open range `[start, end)`.
    pub fn overlaps_point(&self, row: usize, column: usize) -> bool {
        let range = self.normalized();
        let point = Position::new(row, column);
        range.start <= point && point < range.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A [`Range`] together with the character offsets it denotes in a specific text.
///
/// The two views are computed together and are only meaningful for the text they were built
/// from; rebuild the value whenever the text changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    range: Range,
    start_offset: usize,
    end_offset: usize,
}

impl TextRange {
    /// Build from character offsets, clamped to the text length.
    ///
    /// `start > end` yields a backwards range.
    pub fn from_offsets(text: &Rope, start: usize, end: usize) -> Self {
        let index = LineIndex::from_rope(text);
        let start_offset = start.min(index.char_count());
        let end_offset = end.min(index.char_count());
        Self {
            range: Range::from_positions(
                index.char_offset_to_position(start_offset),
                index.char_offset_to_position(end_offset),
            ),
            start_offset,
            end_offset,
        }
    }

    /// Build from a row/column range, clamping positions that fall outside the text.
    pub fn from_range(text: &Rope, range: Range) -> Self {
        let index = LineIndex::from_rope(text);
        let start_offset = index.position_to_char_offset(range.start);
        let end_offset = index.position_to_char_offset(range.end);
        Self {
            range: Range::from_positions(
                index.char_offset_to_position(start_offset),
                index.char_offset_to_position(end_offset),
            ),
            start_offset,
            end_offset,
        }
    }

    /// Row/column view.
    pub fn range(&self) -> Range {
        self.range
    }

    /// Character offset of the start (anchor).
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Character offset of the end (active end).
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Cursor position: the active end of the range.
    pub fn cursor(&self) -> usize {
        self.end_offset
    }

    /// Whether the range is empty.
    pub fn is_zero_length(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Whether the anchor comes after the active end.
    pub fn is_backwards(&self) -> bool {
        self.start_offset > self.end_offset
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.start_offset.abs_diff(self.end_offset)
    }

    /// Whether no characters are covered.
    pub fn is_empty(&self) -> bool {
        self.is_zero_length()
    }
}

/// A range as reported across the session boundary: either row/column or character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSpec {
    /// Row/column endpoints.
    RowCol(Range),
    /// Character offsets; `start > end` denotes a backwards range.
    Offsets {
        /// Anchor offset.
        start: usize,
        /// Active-end offset.
        end: usize,
    },
}

impl RangeSpec {
    /// Resolve against `text`, clamping anything outside it.
    pub fn resolve(&self, text: &Rope) -> TextRange {
        match *self {
            Self::RowCol(range) => TextRange::from_range(text, range),
            Self::Offsets { start, end } => TextRange::from_offsets(text, start, end),
        }
    }
}

impl From<Range> for RangeSpec {
    fn from(range: Range) -> Self {
        Self::RowCol(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_spec_resolves_both_forms() {
        let text = Rope::from_str("one\ntwo");
        let by_offsets = RangeSpec::Offsets { start: 4, end: 6 }.resolve(&text);
        let by_row_col = RangeSpec::from(Range::new(1, 0, 1, 2)).resolve(&text);
        assert_eq!(by_offsets, by_row_col);
        assert_eq!(by_offsets.range(), Range::new(1, 0, 1, 2));
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(1, 2) < Position::new(1, 3));
        assert_eq!(Position::new(4, 4).cmp(&Position::new(4, 4)), Ordering::Equal);
    }

    #[test]
    fn test_backwards_and_normalize() {
        let r = Range::new(2, 5, 1, 3);
        assert!(r.is_backwards());
        assert_eq!(r.normalized(), Range::new(1, 3, 2, 5));
        assert!(!r.normalized().is_backwards());

        let same_row = Range::new(0, 4, 0, 1);
        assert!(same_row.is_backwards());

        let forward = Range::new(0, 1, 0, 4);
        assert_eq!(forward.normalized(), forward);
    }

    #[test]
    fn test_zero_length() {
        assert!(Range::new(3, 3, 3, 3).is_zero_length());
        assert!(Range::point(Position::new(1, 1)).is_zero_length());
        assert!(!Range::new(3, 3, 3, 4).is_zero_length());
        assert!(!Range::new(3, 3, 3, 3).is_backwards());
    }

    #[test]
    fn test_overlaps_point_half_open() {
        let r = Range::new(1, 2, 2, 1);
        assert!(r.overlaps_point(1, 2));
        assert!(r.overlaps_point(1, 80));
        assert!(r.overlaps_point(2, 0));
        assert!(!r.overlaps_point(2, 1));
        assert!(!r.overlaps_point(1, 1));

        // Direction does not matter.
        let backwards = Range::new(2, 1, 1, 2);
        assert!(backwards.overlaps_point(1, 5));

        assert!(!Range::new(0, 0, 0, 0).overlaps_point(0, 0));
    }

    #[test]
    fn test_text_range_from_offsets() {
        let text = Rope::from_str("ab\ncd\nef");
        let tr = TextRange::from_offsets(&text, 1, 7);
        assert_eq!(tr.range(), Range::new(0, 1, 2, 1));
        assert_eq!(tr.len(), 6);
        assert_eq!(tr.cursor(), 7);

        let backwards = TextRange::from_offsets(&text, 4, 0);
        assert!(backwards.is_backwards());
        assert_eq!(backwards.range(), Range::new(1, 1, 0, 0));

        let clamped = TextRange::from_offsets(&text, 100, 200);
        assert_eq!(clamped.start_offset(), 8);
        assert_eq!(clamped.range(), Range::new(2, 2, 2, 2));
    }

    #[test]
    fn test_text_range_from_range_clamps() {
        let text = Rope::from_str("ab\ncd");
        let tr = TextRange::from_range(&text, Range::new(0, 9, 5, 0));
        assert_eq!(tr.start_offset(), 2);
        assert_eq!(tr.end_offset(), 5);
        assert_eq!(tr.range(), Range::new(0, 2, 1, 2));
    }

    #[test]
    fn test_text_range_on_empty_text() {
        let text = Rope::new();
        let tr = TextRange::from_range(&text, Range::new(3, 3, 4, 4));
        assert_eq!(tr, TextRange::default());
    }
}
