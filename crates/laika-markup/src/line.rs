//! Root-anchored line slicing shared by both markup languages' block
//! parsers.
//!
//! Every [`Line`] borrows directly from the original (whitespace-
//! preprocessed) input and carries the true byte offset of its first byte
//! within that input. Container parsers (blockquote, list items) recurse
//! by *stripping* a prefix's byte length from each line and adjusting
//! `start` by the same amount — never by rebuilding an owned string — so a
//! leaf block's captured [`laika_ast::SourceFragment`] is always a genuine
//! substring of the root document, however deeply it is nested inside
//! containers.

use laika_parse::Cursor;

#[derive(Clone, Copy, Debug)]
pub struct Line<'a> {
    pub text: &'a str,
    pub start: usize,
}

pub fn lines_of<'a>(root: &'a str) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in root.split('\n') {
        lines.push(Line { text: raw, start: offset });
        offset += raw.len() + 1;
    }
    lines
}

impl<'a> Line<'a> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    /// Strips `n` bytes from the front, returning `None` if the line is
    /// shorter than `n` (it doesn't belong to a container requiring that
    /// much prefix).
    pub fn strip_prefix_bytes(&self, n: usize) -> Option<Line<'a>> {
        if self.text.len() < n {
            None
        } else {
            Some(Line {
                text: &self.text[n..],
                start: self.start + n,
            })
        }
    }

    /// The absolute end offset (exclusive) of this line's text, not
    /// including its trailing newline.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Byte offset of `child` within `parent`, assuming `child` is a subslice of
/// `parent` obtained by slicing (as every `Line::text` derivative is). Lets
/// callers track positions through `trim`/indexing without re-deriving
/// lengths by hand.
pub fn offset_within(parent: &str, child: &str) -> usize {
    (child.as_ptr() as usize)
        .checked_sub(parent.as_ptr() as usize)
        .expect("child must be a subslice of parent")
}

/// Builds a [`laika_ast::SourceFragment`] spanning a run of (possibly
/// prefix-stripped) lines, joining their text back together with `\n`.
/// Line/column is resolved from the *first* line's genuine root offset, so
/// it is always exact even when the lines were stripped out of a
/// blockquote or list item; `end` is a best-effort offset (`start` plus the
/// joined text's length) since a stripped run's lines aren't necessarily
/// contiguous in the root document.
pub fn fragment_for_lines(root: &str, lines: &[Line<'_>]) -> laika_ast::SourceFragment {
    let start = lines[0].start;
    let text = lines
        .iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n");
    let end = start + text.len();
    let pos = Cursor::new(root).advance(start).position();
    laika_ast::SourceFragment {
        text,
        start,
        end,
        line: pos.line,
        column: pos.column,
    }
}
