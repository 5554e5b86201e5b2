//! [`SourceFragment`]: a captured substring of the original input, carrying
//! positional metadata so a rewrite-phase error (§4.5) or an `Invalid` node
//! (§3.3) can still point back at exactly where it came from, regardless of
//! how many parsing passes separate the node from the raw source.

use laika_parse::{Cursor, Fragment};

/// An owned snapshot of a [`laika_parse::Fragment`] plus the line/column it
/// resolved to at capture time. Owned (not borrowed) because AST nodes must
/// outlive the parse that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFragment {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceFragment {
    /// Builds a fragment from a parser-level `Fragment` plus the cursor it
    /// was captured from (used to resolve the line/column once, at capture
    /// time, rather than re-deriving it every time the fragment is later
    /// displayed in a diagnostic).
    pub fn from_cursor(start_cursor: Cursor<'_>, fragment: Fragment<'_>) -> Self {
        let pos = start_cursor.position();
        SourceFragment {
            text: fragment.text.to_string(),
            start: fragment.start,
            end: fragment.end,
            line: pos.line,
            column: pos.column,
        }
    }

    pub fn synthetic(text: impl Into<String>) -> Self {
        SourceFragment {
            text: text.into(),
            start: 0,
            end: 0,
            line: 0,
            column: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cursor_resolves_line_and_column() {
        let root = "one\ntwo three\n";
        let at = root.find("three").unwrap();
        let cur = Cursor::new(root).advance(at);
        let frag = Fragment {
            text: "three",
            start: at,
            end: at + 5,
        };
        let sf = SourceFragment::from_cursor(cur, frag);
        assert_eq!(sf.line, 2);
        assert_eq!(sf.text, "three");
    }
}
