//! Row/column index over document text
//!
//! Provides line indexing using the Rope data structure, supporting O(log N) conversion between
//! character offsets and `(row, column)` positions.
//!
//! Only `'\n'` is treated as a line break. A `'\r'` preceding it is an ordinary character of the
//! row, which keeps offsets and positions consistent with how edit events count columns.

use crate::range::Position;
use ropey::Rope;

/// Logical line index - implemented using Rope data structure
///
/// Cloning a [`Rope`] is O(1), so building an index over a snapshot's text shares its storage.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an index over an empty text.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Build line index sharing an existing rope.
    pub fn from_rope(rope: &Rope) -> Self {
        Self { rope: rope.clone() }
    }

    /// Get row and column from character offset.
    ///
    /// Offsets past the end of the text are clamped to the end.
    pub fn char_offset_to_position(&self, char_offset: usize) -> Position {
        let char_offset = char_offset.min(self.rope.len_chars());

        let row = self.rope.char_to_line(char_offset);
        let row_start = self.rope.line_to_char(row);

        Position::new(row, char_offset - row_start)
    }

    /// Get character offset from row and column.
    ///
    /// Rows past the last row map to the end of the text; columns past the end of a row map
    /// to the end of that row.
    pub fn position_to_char_offset(&self, position: Position) -> usize {
        if position.row >= self.rope.len_lines() {
            return self.rope.len_chars();
        }

        let row_start = self.rope.line_to_char(position.row);
        row_start + position.column.min(self.line_len(position.row))
    }

    /// Length of a row in characters, excluding its trailing `'\n'`.
    ///
    /// Returns 0 for rows that do not exist.
    pub fn line_len(&self, row: usize) -> usize {
        let line_count = self.rope.len_lines();
        if row >= line_count {
            return 0;
        }

        let row_start = self.rope.line_to_char(row);
        if row + 1 < line_count {
            self.rope.line_to_char(row + 1) - row_start - 1
        } else {
            self.rope.len_chars() - row_start
        }
    }

    /// Get total row count (an empty text has one row).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get text of the specified row (excluding newline)
    pub fn get_line_text(&self, row: usize) -> Option<String> {
        if row >= self.rope.len_lines() {
            return None;
        }

        let mut text = self.rope.line(row).to_string();
        if text.ends_with('\n') {
            text.pop();
        }

        Some(text)
    }
}

/// Position just past `inserted` when it is inserted at `start`.
pub fn end_position_after(start: Position, inserted: &str) -> Position {
    match inserted.rfind('\n') {
        None => Position::new(start.row, start.column + inserted.chars().count()),
        Some(last_newline) => {
            let rows = inserted.matches('\n').count();
            let tail = inserted[last_newline + 1..].chars().count();
            Position::new(start.row + rows, tail)
        }
    }
}
