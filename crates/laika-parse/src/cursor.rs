//! Position-tracking input cursor.
//!
//! A [`Cursor`] is an immutable handle over a root input string. Cursors are
//! values: every combinator that "consumes" input does so by producing a new
//! cursor rather than mutating one in place. This is what lets an alternation
//! retry a failed branch from the same starting position, and what lets a
//! captured sub-source (see [`Cursor::nested`]) keep reporting line/column
//! numbers against the *original* document even though the span parser only
//! ever sees the captured substring.

use std::fmt;

/// A resolved `(line, column)` location plus the source line's text, for
/// diagnostics. Both `line` and `column` are 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// The full text of the line this position falls on, without its
    /// trailing newline.
    pub line_content: String,
}

impl Position {
    /// Renders a `line_content` followed by a caret line pointing at
    /// `column`, the classic compiler-diagnostic shape.
    pub fn caret_display(&self) -> String {
        let mut caret = String::new();
        for _ in 1..self.column {
            caret.push(' ');
        }
        caret.push('^');
        format!("{}\n{}", self.line_content, caret)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An immutable cursor over `input`, tracking its position both within
/// `input` and against the `root` document it was ultimately derived from.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    root: &'a str,
    /// Byte offset of `input`'s first byte within `root`.
    base: usize,
    input: &'a str,
    /// Byte offset within `input`.
    offset: usize,
    line: usize,
    column: usize,
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos())
            .field("line", &self.line)
            .field("column", &self.column)
            .field("remaining_preview", &self.remaining().chars().take(16).collect::<String>())
            .finish()
    }
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `input`, treating it as
    /// its own root.
    pub fn new(input: &'a str) -> Self {
        Cursor {
            root: input,
            base: 0,
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Spawns a cursor over a captured sub-source (`input`), anchored so that
    /// diagnostics still resolve against `root`. `base` is the byte offset of
    /// `input`'s first byte within `root`.
    ///
    /// This is how the two-pass block/span discipline (§4.3) recovers
    /// original positions: the block pass captures a [`crate::fragment::SourceFragment`]
    /// and the span pass later re-parses it through a nested cursor.
    pub fn nested(root: &'a str, input: &'a str, base: usize) -> Self {
        let (line, column) = line_col_at(root, base);
        Cursor {
            root,
            base,
            input,
            offset: 0,
            line,
            column,
        }
    }

    /// Absolute offset of the current position within `root`.
    pub fn pos(&self) -> usize {
        self.base + self.offset
    }

    /// The full root document, for slicing arbitrary absolute ranges.
    pub fn root(&self) -> &'a str {
        self.root
    }

    /// Everything the cursor has not yet consumed, scoped to `input`.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.offset..]
    }

    pub fn at_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// The byte at `rel_offset` past the current position, if any.
    pub fn byte_at(&self, rel_offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.offset + rel_offset).copied()
    }

    /// The char starting at `rel_offset` bytes past the current position.
    pub fn char_at(&self, rel_offset: usize) -> Option<char> {
        self.input.get(self.offset + rel_offset..)?.chars().next()
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        self.remaining().starts_with(pat)
    }

    /// Returns the text consumed by advancing `n` bytes, without moving the
    /// cursor.
    pub fn capture(&self, n: usize) -> &'a str {
        let end = (self.offset + n).min(self.input.len());
        &self.input[self.offset..end]
    }

    /// Produces a new cursor `n` bytes further along, updating line/column
    /// as it crosses newlines. Panics if `n` would split a UTF-8 code point
    /// or run past the end of `input` — callers are expected to only advance
    /// by lengths they have already validated (e.g. via `capture`).
    pub fn advance(&self, n: usize) -> Cursor<'a> {
        let end = self.offset + n;
        assert!(end <= self.input.len(), "advance past end of input");
        assert!(self.input.is_char_boundary(end), "advance splits a UTF-8 char");
        let mut line = self.line;
        let mut column = self.column;
        for b in self.input[self.offset..end].bytes() {
            if b == b'\n' {
                line += 1;
                column = 1;
            } else if b & 0b1100_0000 != 0b1000_0000 {
                // count only UTF-8 lead/ASCII bytes as columns (continuation
                // bytes don't advance the visible column)
                column += 1;
            }
        }
        Cursor {
            root: self.root,
            base: self.base,
            input: self.input,
            offset: end,
            line,
            column,
        }
    }

    /// The text of the line this cursor's position falls on, without a
    /// trailing newline.
    pub fn line_content(&self) -> &'a str {
        let start = self.root[..self.pos()].rfind('\n').map_or(0, |i| i + 1);
        let end = self.root[self.pos()..]
            .find('\n')
            .map_or(self.root.len(), |i| self.pos() + i);
        &self.root[start..end]
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            line_content: self.line_content().to_string(),
        }
    }
}

/// Scans `root` up to byte offset `at` to compute a 1-based `(line, column)`.
/// Used once when spawning a nested cursor over a captured fragment; after
/// that the nested cursor tracks position incrementally via `advance`.
fn line_col_at(root: &str, at: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for b in root[..at.min(root.len())].bytes() {
        if b == b'\n' {
            line += 1;
            column = 1;
        } else if b & 0b1100_0000 != 0b1000_0000 {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_starts_at_one_one() {
        let cur = Cursor::new("hello\nworld");
        assert_eq!(cur.pos(), 0);
        assert_eq!(cur.position().line, 1);
        assert_eq!(cur.position().column, 1);
    }

    #[test]
    fn advance_crosses_newline() {
        let cur = Cursor::new("ab\ncd");
        let cur = cur.advance(3); // consumes "ab\n"
        assert_eq!(cur.position().line, 2);
        assert_eq!(cur.position().column, 1);
        assert_eq!(cur.remaining(), "cd");
    }

    #[test]
    fn capture_does_not_move_cursor() {
        let cur = Cursor::new("hello");
        assert_eq!(cur.capture(3), "hel");
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn nested_cursor_reports_root_position() {
        let root = "line one\nline two [em]\nline three";
        let captured_start = root.find("[em]").unwrap();
        let captured = &root[captured_start..captured_start + 4];
        let nested = Cursor::nested(root, captured, captured_start);
        assert_eq!(nested.position().line, 2);
        assert_eq!(nested.position().column, 11);
        assert_eq!(nested.line_content(), "line two [em]");
    }

    #[test]
    fn line_content_finds_full_line_from_nested_cursor() {
        let root = "first\nsecond line here\nthird";
        let captured = &root[6..12]; // "second"
        let nested = Cursor::nested(root, captured, 6);
        assert_eq!(nested.line_content(), "second line here");
    }

    #[test]
    fn position_caret_display_points_at_column() {
        let cur = Cursor::new("abc").advance(2);
        let pos = cur.position();
        assert_eq!(pos.caret_display(), "abc\n  ^");
    }
}
