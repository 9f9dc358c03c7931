//! Rope-based text buffer abstraction.

use anyhow::Result;
use ropey::Rope;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

/// A position inside a buffer expressed as (line index, byte offset within that line).
/// Byte offsets are kept on UTF-8 boundaries; grapheme safety is enforced by the
/// editing helpers below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }
    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Entire buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Line contents without the trailing newline; empty for out of range lines.
    pub fn line_content(&self, idx: usize) -> String {
        let Some(mut s) = self.line(idx) else {
            return String::new();
        };
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// Byte length of a line (excluding any newline) for clamping purposes.
    pub fn line_byte_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let len = line.len_bytes();
        if len > 0 && line.char(line.len_chars() - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Clamp a position onto an existing line and inside that line's text.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let byte = pos.byte.min(self.line_byte_len(line));
        Position { line, byte }
    }

    /// Absolute byte offset of a (clamped) position.
    pub fn offset_of(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_byte(pos.line) + pos.byte
    }

    /// Position of an absolute byte offset (clamped to the buffer end).
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_bytes());
        let line = self.rope.byte_to_line(offset);
        Position {
            line,
            byte: offset - self.rope.line_to_byte(line),
        }
    }

    /// True when `pos` is on an existing line, inside its text, and on a UTF-8
    /// character boundary.
    pub fn is_char_boundary(&self, pos: Position) -> bool {
        if pos.line >= self.line_count() || pos.byte > self.line_byte_len(pos.line) {
            return false;
        }
        let offset = self.rope.line_to_byte(pos.line) + pos.byte;
        self.rope.char_to_byte(self.rope.byte_to_char(offset)) == offset
    }

    /// Insert text at the position; advances the position past the inserted text
    /// (onto a later line when the text contains newlines).
    pub fn insert_str(&mut self, pos: &mut Position, text: &str) {
        let offset = self.offset_of(*pos);
        let char_index = self.rope.byte_to_char(offset);
        self.rope.insert(char_index, text);
        *pos = self.position_of(offset + text.len());
    }

    /// Delete the UTF-8 slice in absolute byte range `[start,end)` (clamped).
    /// Returns the removed text.
    pub fn delete_bytes(&mut self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        let removed = self.rope.slice(start_char..end_char).to_string();
        self.rope.remove(start_char..end_char);
        removed
    }

    /// Replace the absolute byte range `[start,end)` with `text`.
    pub fn replace_bytes(&mut self, start: usize, end: usize, text: &str) {
        self.delete_bytes(start, end);
        let mut pos = self.position_of(start);
        self.insert_str(&mut pos, text);
    }
}

/// Grapheme and word utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Visual column (terminal cells) up to (but not including) byte offset. Tabs
    /// advance to the next multiple of `tab_stop`.
    pub fn visual_col(line: &str, byte: usize, tab_stop: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += cluster_width(g, col, tab_stop);
        }
        col
    }

    /// Width in terminal cells of this grapheme cluster starting at `col`.
    pub fn cluster_width(g: &str, col: usize, tab_stop: usize) -> usize {
        if g == "\t" {
            let stop = tab_stop.max(1);
            stop - col % stop
        } else {
            g.width()
        }
    }

    /// Word-constituent character: alphanumeric or underscore.
    pub fn is_word_char(c: char) -> bool {
        c == '_' || c.is_alphanumeric()
    }

}

#[cfg(test)]
mod tests {
    use super::grapheme;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).unwrap(), "hello\n");
        assert_eq!(b.line(1).unwrap(), "world");
        assert_eq!(b.line_content(0), "hello");
        assert_eq!(b.line_byte_len(0), 5);
        assert_eq!(b.line_byte_len(1), 5);
    }

    #[test]
    fn offsets_and_positions_agree() {
        let b = Buffer::from_str("t", "ab\ncde\n").unwrap();
        assert_eq!(b.offset_of(Position::new(1, 2)), 5);
        assert_eq!(b.position_of(5), Position::new(1, 2));
        assert_eq!(b.position_of(3), Position::new(1, 0));
        // clamped past end of line
        assert_eq!(b.offset_of(Position::new(0, 10)), 2);
    }

    #[test]
    fn insert_str_advances_across_lines() {
        let mut b = Buffer::from_str("t", "ad").unwrap();
        let mut pos = Position::new(0, 1);
        b.insert_str(&mut pos, "b\nc");
        assert_eq!(b.text(), "ab\ncd");
        assert_eq!(pos, Position::new(1, 1));
    }

    #[test]
    fn char_boundaries_follow_utf8() {
        let b = Buffer::from_str("t", "é
ab").unwrap();
        assert!(b.is_char_boundary(Position::new(0, 0)));
        assert!(!b.is_char_boundary(Position::new(0, 1)));
        assert!(b.is_char_boundary(Position::new(0, 2)));
        assert!(!b.is_char_boundary(Position::new(0, 3)));
        assert!(b.is_char_boundary(Position::new(1, 2)));
        assert!(!b.is_char_boundary(Position::new(2, 0)));
    }

    #[test]
    fn grapheme_combining_mark() {
        let s = "e\u{0301}"; // 'e' + combining acute
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(nb, s.len()); // should be single cluster
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
    }

    #[test]
    fn visual_col_expands_tabs() {
        assert_eq!(grapheme::visual_col("\tab", 1, 8), 8);
        assert_eq!(grapheme::visual_col("ab\tc", 3, 4), 4);
        assert_eq!(grapheme::visual_col("abc", 3, 8), 3);
    }

    #[test]
    fn replace_bytes_swaps_range() {
        let mut b = Buffer::from_str("t", "cat dog").unwrap();
        b.replace_bytes(4, 7, "tree");
        assert_eq!(b.text(), "cat tree");
    }
}
