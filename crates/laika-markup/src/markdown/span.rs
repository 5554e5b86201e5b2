//! Markdown/GFM inline span grammar (§4.1, §4.3): a hand-rolled recursive
//! descent built directly on [`laika_parse::Cursor`], following the
//! "longer delimiter run binds first" precedence for emphasis/strong.
//! `~~text~~` strikethrough and bracketed `<http://...>` autolinks are GFM
//! additions handled the same way; bare-URL/email autolinks (no brackets
//! needed) are handled upstream in `crate::inline::push_text`, shared with
//! the reStructuredText front end.

use laika_ast::{path, LinkTarget, Options, SourceFragment, Span};
use laika_parse::Cursor;

use crate::inline::{plain_text, push_text};

const SPECIAL: [char; 8] = ['*', '_', '`', '[', '!', '\\', '~', '<'];

pub fn parse_spans(root: &str, fragment: &SourceFragment) -> Vec<Span> {
    if fragment.text.is_empty() {
        return vec![];
    }
    let cur = Cursor::nested(root, &fragment.text, fragment.start);
    spans_until(cur, "").0
}

fn next_special_or_end(text: &str, end_delim: &str) -> Option<usize> {
    let mut idx = if end_delim.is_empty() { None } else { text.find(end_delim) };
    for (i, c) in text.char_indices() {
        if SPECIAL.contains(&c) {
            idx = Some(idx.map_or(i, |j| j.min(i)));
            break;
        }
    }
    idx
}

fn spans_until<'a>(mut cur: Cursor<'a>, end_delim: &str) -> (Vec<Span>, Cursor<'a>) {
    let mut spans = Vec::new();
    loop {
        if !end_delim.is_empty() && cur.starts_with(end_delim) {
            return (spans, cur.advance(end_delim.len()));
        }
        if cur.at_eof() {
            return (spans, cur);
        }
        let text = cur.remaining();
        match next_special_or_end(text, end_delim) {
            None => {
                push_text(&mut spans, text);
                return (spans, cur.advance(text.len()));
            }
            Some(idx) => {
                if idx > 0 {
                    push_text(&mut spans, &text[..idx]);
                }
                cur = cur.advance(idx);
                if !end_delim.is_empty() && cur.starts_with(end_delim) {
                    return (spans, cur.advance(end_delim.len()));
                }
                if cur.at_eof() {
                    return (spans, cur);
                }
                let (span, next) = parse_one(cur);
                spans.push(span);
                cur = next;
            }
        }
    }
}

fn parse_one<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    match cur.char_at(0).expect("parse_one called at eof") {
        '*' | '_' => parse_emphasis_or_strong(cur),
        '`' => parse_inline_code(cur),
        '!' => parse_image_or_text(cur),
        '[' => parse_link_or_reference(cur),
        '\\' => parse_backslash_escape(cur),
        '~' => parse_strikethrough_or_text(cur),
        '<' => parse_angle_autolink_or_text(cur),
        _ => unreachable!("dispatched on a non-special character"),
    }
}

/// GFM strikethrough: exactly two tildes open and close a run (§4.3). A
/// lone `~` (not doubled) isn't a delimiter and is emitted as literal text.
fn parse_strikethrough_or_text<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    if !cur.starts_with("~~") {
        return (Span::Text("~".to_string()), cur.advance(1));
    }
    let after_marker = cur.advance(2);
    let (inner, next) = spans_until(after_marker, "~~");
    (Span::Strikethrough(inner, Options::empty()), next)
}

/// CommonMark's bracketed autolink form, `<scheme:rest>` or `<user@host>`
/// (§4.3/§6.3's "safe delimiter boundary" for autolinks). Anything else
/// starting with `<` is emitted as literal text — this toolkit doesn't
/// parse raw inline HTML.
fn parse_angle_autolink_or_text<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let rest = cur.remaining();
    if let Some(close) = rest.find('>') {
        let inner = &rest[1..close];
        if is_autolink_uri(inner) || is_autolink_email(inner) {
            let next = cur.advance(close + 1);
            let target = if is_autolink_email(inner) {
                LinkTarget::External(format!("mailto:{inner}"))
            } else {
                LinkTarget::External(inner.to_string())
            };
            return (
                Span::SpanLink {
                    content: vec![Span::Text(inner.to_string())],
                    target,
                    title: None,
                    options: Options::empty(),
                },
                next,
            );
        }
    }
    (Span::Text("<".to_string()), cur.advance(1))
}

fn is_autolink_uri(s: &str) -> bool {
    let Some(colon) = s.find(':') else { return false };
    let (scheme, rest) = (&s[..colon], &s[colon + 1..]);
    !scheme.is_empty()
        && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        && !rest.is_empty()
        && !s.chars().any(|c| c.is_whitespace() || c == '<')
}

fn is_autolink_email(s: &str) -> bool {
    !s.is_empty()
        && !s.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>'))
        && s.matches('@').count() == 1
        && s.split('@').all(|part| !part.is_empty())
}

fn parse_emphasis_or_strong<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let c = cur.char_at(0).unwrap();
    let text = cur.remaining();
    let run = text.chars().take_while(|&x| x == c).count();
    let n = run.min(2);
    let marker: String = std::iter::repeat(c).take(n).collect();
    let after_marker = cur.advance(marker.len());
    let (inner, next) = spans_until(after_marker, &marker);
    let span = if n == 2 {
        Span::Strong(inner, Options::empty())
    } else {
        Span::Emphasized(inner, Options::empty())
    };
    (span, next)
}

fn parse_inline_code<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let text = cur.remaining();
    let run = text.chars().take_while(|&x| x == '`').count();
    let marker: String = "`".repeat(run);
    let after = cur.advance(marker.len());
    let rest = after.remaining();
    if let Some(idx) = rest.find(&marker) {
        let content = rest[..idx].trim();
        let next = after.advance(idx + marker.len());
        (
            Span::InlineCode {
                lang: None,
                spans: vec![Span::Text(content.to_string())],
                options: Options::empty(),
            },
            next,
        )
    } else {
        (Span::Text(marker), after)
    }
}

fn split_target_title(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    if let Some(space_idx) = raw.find(char::is_whitespace) {
        let target = &raw[..space_idx];
        let rest = raw[space_idx..].trim();
        let title = rest.trim_matches(|c| c == '"' || c == '\'');
        if !title.is_empty() {
            return (target.to_string(), Some(title.to_string()));
        }
    }
    (raw.to_string(), None)
}

fn make_link_target(s: String) -> LinkTarget {
    if s.contains("://") {
        LinkTarget::External(s)
    } else {
        LinkTarget::Internal(path(s))
    }
}

fn parse_link_or_reference<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let after_bracket = cur.advance(1);
    let (content, next) = spans_until(after_bracket, "]");

    if next.starts_with("(") {
        let inner = next.advance(1);
        if let Some(close) = inner.remaining().find(')') {
            let raw = &inner.remaining()[..close];
            let after = inner.advance(close + 1);
            let (target, title) = split_target_title(raw);
            return (
                Span::SpanLink {
                    content,
                    target: make_link_target(target),
                    title,
                    options: Options::empty(),
                },
                after,
            );
        }
    }

    if next.starts_with("[") {
        let inner = next.advance(1);
        if let Some(close) = inner.remaining().find(']') {
            let raw_id = inner.remaining()[..close].trim().to_string();
            let after = inner.advance(close + 1);
            let label = plain_text(&content);
            let id = if raw_id.is_empty() { label.clone() } else { raw_id };
            let source = SourceFragment::synthetic(format!("[{label}][{id}]"));
            return (Span::LinkIdReference { id, content, source }, after);
        }
    }

    let id = plain_text(&content);
    let source = SourceFragment::synthetic(format!("[{id}]"));
    (Span::LinkIdReference { id, content, source }, next)
}

fn parse_image_or_text<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    if cur.char_at(1) != Some('[') {
        return (Span::Text("!".to_string()), cur.advance(1));
    }
    let after_bracket = cur.advance(2);
    let (alt_spans, next) = spans_until(after_bracket, "]");
    let alt = plain_text(&alt_spans);
    let alt = if alt.is_empty() { None } else { Some(alt) };

    if next.starts_with("(") {
        let inner = next.advance(1);
        if let Some(close) = inner.remaining().find(')') {
            let raw = &inner.remaining()[..close];
            let after = inner.advance(close + 1);
            let (target, title) = split_target_title(raw);
            return (
                Span::Image { target: make_link_target(target), alt, title, options: Options::empty() },
                after,
            );
        }
    }
    (Span::Text(format!("![{}]", alt.unwrap_or_default())), next)
}

fn parse_backslash_escape<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    if let Some(c) = cur.char_at(1) {
        if "\\`*_{}[]()#+-.!<>~".contains(c) {
            return (Span::Text(c.to_string()), cur.advance(1 + c.len_utf8()));
        }
    }
    (Span::Text("\\".to_string()), cur.advance(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(text: &str) -> Vec<Span> {
        let fragment = SourceFragment { text: text.to_string(), start: 0, end: text.len(), line: 1, column: 1 };
        parse_spans(text, &fragment)
    }

    #[test]
    fn parses_strong_then_plain_text() {
        let spans = spans_of("**bold** and text");
        match &spans[0] {
            Span::Strong(inner, _) => assert_eq!(inner, &vec![Span::Text("bold".to_string())]),
            other => panic!("expected strong, got {other:?}"),
        }
        assert!(matches!(&spans[1], Span::Text(t) if t.contains("and text")));
    }

    #[test]
    fn parses_emphasis_with_single_delimiter() {
        let spans = spans_of("*em*");
        assert!(matches!(&spans[0], Span::Emphasized(inner, _) if inner == &vec![Span::Text("em".to_string())]));
    }

    #[test]
    fn parses_strikethrough() {
        let spans = spans_of("~~gone~~ and text");
        match &spans[0] {
            Span::Strikethrough(inner, _) => assert_eq!(inner, &vec![Span::Text("gone".to_string())]),
            other => panic!("expected strikethrough, got {other:?}"),
        }
        assert!(matches!(&spans[1], Span::Text(t) if t.contains("and text")));
    }

    #[test]
    fn a_lone_tilde_is_literal_text() {
        let spans = spans_of("a ~ b");
        let joined = plain_text(&spans);
        assert!(joined.contains('~'));
    }

    #[test]
    fn parses_a_bracketed_uri_autolink() {
        let spans = spans_of("<https://example.com/a>");
        match &spans[0] {
            Span::SpanLink { target: LinkTarget::External(url), .. } => assert_eq!(url, "https://example.com/a"),
            other => panic!("expected span link, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_bracketed_email_autolink() {
        let spans = spans_of("<dev@example.com>");
        match &spans[0] {
            Span::SpanLink { target: LinkTarget::External(url), .. } => assert_eq!(url, "mailto:dev@example.com"),
            other => panic!("expected span link, got {other:?}"),
        }
    }

    #[test]
    fn a_bare_url_in_running_text_is_an_autolink() {
        let spans = spans_of("visit http://example.com today");
        assert!(spans.iter().any(|s| matches!(s, Span::SpanLink { target: LinkTarget::External(u), .. } if u == "http://example.com")));
    }

    #[test]
    fn parses_inline_code() {
        let spans = spans_of("`code`");
        match &spans[0] {
            Span::InlineCode { spans, .. } => assert_eq!(spans, &vec![Span::Text("code".to_string())]),
            other => panic!("expected inline code, got {other:?}"),
        }
    }

    #[test]
    fn parses_an_inline_link() {
        let spans = spans_of("[text](/a/b \"title\")");
        match &spans[0] {
            Span::SpanLink { content, target, title, .. } => {
                assert_eq!(plain_text(content), "text");
                assert_eq!(title.as_deref(), Some("title"));
                assert!(matches!(target, LinkTarget::Internal(_)));
            }
            other => panic!("expected span link, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_link_reference_by_id() {
        let spans = spans_of("[text][ref]");
        match &spans[0] {
            Span::LinkIdReference { id, .. } => assert_eq!(id, "ref"),
            other => panic!("expected link id reference, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_shorthand_link_reference() {
        let spans = spans_of("[text]");
        match &spans[0] {
            Span::LinkIdReference { id, .. } => assert_eq!(id, "text"),
            other => panic!("expected link id reference, got {other:?}"),
        }
    }

    #[test]
    fn parses_an_image() {
        let spans = spans_of("![alt](/img.png)");
        match &spans[0] {
            Span::Image { alt, target, .. } => {
                assert_eq!(alt.as_deref(), Some("alt"));
                assert!(matches!(target, LinkTarget::Internal(_)));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn two_trailing_spaces_before_newline_is_a_hard_break() {
        let spans = spans_of("one  \ntwo");
        assert!(spans.iter().any(|s| matches!(s, Span::LineBreak(_))));
    }

    #[test]
    fn backslash_escapes_a_delimiter() {
        let spans = spans_of("\\*not emphasis\\*");
        let joined = plain_text(&spans);
        assert!(joined.contains('*'));
    }
}
