//! `DelimitedText`: the text-scanning building block behind every inline
//! span (§4.1). Reads characters until `delimiter` matches, with options
//! controlling EOF handling, emptiness, and early-abort characters.

use crate::cursor::Cursor;
use crate::parser::Parser;
use crate::result::ParseResult;

/// Options controlling how [`delimited_text`] treats its terminator.
#[derive(Clone, Debug, Default)]
pub struct DelimitedOptions {
    /// EOF counts as a valid terminator (the scan succeeds at end of input
    /// even though `delimiter` never matched).
    pub accept_eof: bool,
    /// At least one character must be consumed before the delimiter.
    pub non_empty: bool,
    /// Leaves the delimiter's text unconsumed (positions the cursor right
    /// before it instead of after it).
    pub keep_delimiter: bool,
    /// Abort (fail) immediately if any of these characters is seen before
    /// the delimiter matches.
    pub fail_on: Vec<char>,
}

impl DelimitedOptions {
    pub fn accept_eof(mut self) -> Self {
        self.accept_eof = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn keep_delimiter(mut self) -> Self {
        self.keep_delimiter = true;
        self
    }

    pub fn fail_on(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.fail_on.extend(chars);
        self
    }
}

/// Scans forward from the cursor until `delimiter` is found, returning the
/// text up to (but not including) the delimiter. `delimiter` is tried at
/// every position — this is a naive scan, appropriate for the short runs
/// inline markup actually produces.
pub fn delimited_text<'a>(delimiter: &'static str, opts: DelimitedOptions) -> Parser<'a, &'a str> {
    Parser::new(move |cur: Cursor<'a>| scan(cur, delimiter, &opts))
}

fn scan<'a>(cur: Cursor<'a>, delimiter: &str, opts: &DelimitedOptions) -> ParseResult<'a, &'a str> {
    let text = cur.remaining();
    let mut idx = 0usize;
    loop {
        if idx >= text.len() {
            if opts.accept_eof {
                return finish(cur, text, idx, idx, opts);
            }
            return ParseResult::failure(
                format!("unterminated text, expected delimiter '{delimiter}'"),
                cur,
            );
        }
        if text[idx..].starts_with(delimiter) {
            return finish(cur, text, idx, idx + delimiter.len(), opts);
        }
        let c = text[idx..].chars().next().unwrap();
        if opts.fail_on.contains(&c) {
            return ParseResult::failure(
                format!("encountered forbidden character '{c}' before delimiter '{delimiter}'"),
                cur.advance(idx),
            );
        }
        idx += c.len_utf8();
    }
}

fn finish<'a>(
    cur: Cursor<'a>,
    text: &'a str,
    content_end: usize,
    after_delim: usize,
    opts: &DelimitedOptions,
) -> ParseResult<'a, &'a str> {
    if opts.non_empty && content_end == 0 {
        return ParseResult::failure("expected non-empty text before delimiter", cur);
    }
    let captured = &text[..content_end];
    let next = if opts.keep_delimiter {
        cur.advance(content_end)
    } else {
        cur.advance(after_delim)
    };
    ParseResult::success(captured, next)
}

/// One step of the inline span-scanning loop (§4.1's "Inline delimiter
/// variant"): either an embedded span begins here (`NestedDelimiter`) or the
/// enclosing span ends here (`EndDelimiter`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineEvent<'a> {
    NestedDelimiter { start_char: char, captured_text: &'a str },
    EndDelimiter { captured_text: &'a str },
}

/// Scans forward looking for either any character in `nested_starts` or a
/// match of `end_delimiter`, whichever comes first; `end_delimiter` wins
/// ties at the same offset. Returns the text collected before whichever was
/// found, paired with which one it was — callers use this to flatten
/// "text, child span, text, child span, ..." into one pass over the input.
pub fn scan_inline_step<'a>(
    cur: Cursor<'a>,
    nested_starts: &[char],
    end_delimiter: &str,
) -> ParseResult<'a, InlineEvent<'a>> {
    let text = cur.remaining();
    let mut idx = 0usize;
    loop {
        if !end_delimiter.is_empty() && text[idx..].starts_with(end_delimiter) {
            let captured = &text[..idx];
            return ParseResult::success(
                InlineEvent::EndDelimiter { captured_text: captured },
                cur.advance(idx),
            );
        }
        if idx >= text.len() {
            // Implicit end-of-input also ends the enclosing span so that an
            // unterminated span (e.g. a dangling "*") still degrades to text
            // rather than looping forever.
            let captured = &text[..idx];
            return ParseResult::success(
                InlineEvent::EndDelimiter { captured_text: captured },
                cur.advance(idx),
            );
        }
        let c = text[idx..].chars().next().unwrap();
        if nested_starts.contains(&c) {
            let captured = &text[..idx];
            return ParseResult::success(
                InlineEvent::NestedDelimiter {
                    start_char: c,
                    captured_text: captured,
                },
                cur.advance(idx),
            );
        }
        idx += c.len_utf8();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_text_stops_before_delimiter() {
        let p = delimited_text("**", DelimitedOptions::default());
        match p.parse(Cursor::new("hello**world")) {
            ParseResult::Success { value, next } => {
                assert_eq!(value, "hello");
                assert_eq!(next.remaining(), "world");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn delimited_text_keep_delimiter_leaves_it_unconsumed() {
        let p = delimited_text("::", DelimitedOptions::default().keep_delimiter());
        match p.parse(Cursor::new("abc::")) {
            ParseResult::Success { value, next } => {
                assert_eq!(value, "abc");
                assert_eq!(next.remaining(), "::");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn delimited_text_without_accept_eof_fails_at_end() {
        let p = delimited_text("**", DelimitedOptions::default());
        assert!(!p.parse(Cursor::new("unterminated")).is_success());
    }

    #[test]
    fn delimited_text_accept_eof_succeeds_at_end() {
        let p = delimited_text("**", DelimitedOptions::default().accept_eof());
        match p.parse(Cursor::new("plain text")) {
            ParseResult::Success { value, next } => {
                assert_eq!(value, "plain text");
                assert!(next.at_eof());
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn delimited_text_non_empty_rejects_immediate_delimiter() {
        let p = delimited_text("**", DelimitedOptions::default().non_empty());
        assert!(!p.parse(Cursor::new("**x")).is_success());
    }

    #[test]
    fn delimited_text_fail_on_aborts_early() {
        let p = delimited_text("**", DelimitedOptions::default().fail_on(['\n']));
        assert!(!p.parse(Cursor::new("abc\ndef**")).is_success());
    }

    #[test]
    fn scan_inline_step_reports_nested_start_before_end() {
        let cur = Cursor::new("hi *there* done*");
        match scan_inline_step(cur, &['*'], "*") {
            ParseResult::Success { value, next } => {
                assert_eq!(
                    value,
                    InlineEvent::NestedDelimiter {
                        start_char: '*',
                        captured_text: "hi "
                    }
                );
                assert_eq!(next.remaining(), "*there* done*");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn scan_inline_step_reports_end_delimiter() {
        let cur = Cursor::new("there* done");
        match scan_inline_step(cur, &[], "*") {
            ParseResult::Success { value, .. } => {
                assert_eq!(value, InlineEvent::EndDelimiter { captured_text: "there" });
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }
}
