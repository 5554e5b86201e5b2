//! reStructuredText inline span grammar (§4.1, §4.3): emphasis/strong share
//! Markdown's asterisk syntax; everything else (interpreted text, inline
//! hyperlink references, substitution/footnote/citation references) is
//! RST-specific.
//!
//! Bare word references (`name_`, without backtick quoting) are not
//! recognized — only the backtick-quoted and bracket forms are, since
//! disambiguating a trailing underscore from word-continuation characters
//! needs a richer tokenizer than this pass has budget for; see `DESIGN.md`.

use laika_ast::{path, FootnoteLabel, LinkTarget, Options, SourceFragment, Span};
use laika_parse::Cursor;

use crate::inline::{plain_text, push_text};

const SPECIAL: [char; 4] = ['*', '`', '|', '['];

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
        '*' => parse_emphasis_or_strong(cur),
        '`' => parse_backtick(cur),
        '|' => parse_substitution_reference(cur),
        '[' => parse_footnote_or_citation_reference(cur),
        _ => unreachable!("dispatched on a non-special character"),
    }
}

fn parse_emphasis_or_strong<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let text = cur.remaining();
    let run = text.chars().take_while(|&x| x == '*').count();
    let n = run.min(2);
    let marker: String = "*".repeat(n);
    let after_marker = cur.advance(marker.len());
    let (inner, next) = spans_until(after_marker, &marker);
    let span = if n == 2 {
        Span::Strong(inner, Options::empty())
    } else {
        Span::Emphasized(inner, Options::empty())
    };
    (span, next)
}

fn parse_backtick<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    if cur.starts_with("``") {
        let after = cur.advance(2);
        if let Some(idx) = after.remaining().find("``") {
            let content = after.remaining()[..idx].to_string();
            let next = after.advance(idx + 2);
            return (Span::Literal(content, Options::empty()), next);
        }
        return (Span::Text("``".to_string()), after);
    }

    let after = cur.advance(1);
    let rest = after.remaining();
    let Some(idx) = rest.find('`') else {
        return (Span::Text("`".to_string()), after);
    };
    let content = rest[..idx].to_string();
    let next = after.advance(idx + 1);

    if next.starts_with('_') {
        let final_cur = next.advance(1);
        return (hyperlink_reference_span(content), final_cur);
    }
    if next.starts_with(':') {
        let after_colon = &next.remaining()[1..];
        if let Some(end) = after_colon.find(':') {
            let role = after_colon[..end].to_string();
            let final_cur = next.advance(1 + end + 1);
            let source = SourceFragment::synthetic(format!("`{content}`:{role}:"));
            return (Span::InterpretedText { text: content, role: Some(role), source }, final_cur);
        }
    }
    let source = SourceFragment::synthetic(format!("`{content}`"));
    (Span::InterpretedText { text: content, role: None, source }, next)
}

fn hyperlink_reference_span(content: String) -> Span {
    if let (Some(lt), Some(gt)) = (content.find('<'), content.rfind('>')) {
        if lt < gt {
            let label = content[..lt].trim().to_string();
            let url = content[lt + 1..gt].trim().to_string();
            let target = if url.contains("://") {
                LinkTarget::External(url)
            } else {
                LinkTarget::Internal(path(url))
            };
            return Span::SpanLink { content: vec![Span::Text(label)], target, title: None, options: Options::empty() };
        }
    }
    let id = content.trim().to_string();
    let source = SourceFragment::synthetic(format!("`{id}`_"));
    Span::LinkIdReference { id: id.clone(), content: vec![Span::Text(id)], source }
}

fn parse_substitution_reference<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let after = cur.advance(1);
    if let Some(idx) = after.remaining().find('|') {
        let name = after.remaining()[..idx].to_string();
        let next = after.advance(idx + 1);
        let source = SourceFragment::synthetic(format!("|{name}|"));
        return (Span::SubstitutionReference { name, source }, next);
    }
    (Span::Text("|".to_string()), after)
}

fn parse_footnote_or_citation_reference<'a>(cur: Cursor<'a>) -> (Span, Cursor<'a>) {
    let after = cur.advance(1);
    if let Some(idx) = after.remaining().find(']') {
        let label = after.remaining()[..idx].to_string();
        let next = after.advance(idx + 1);
        if next.starts_with('_') {
            let final_cur = next.advance(1);
            let source = SourceFragment::synthetic(format!("[{label}]_"));
            if let Some(n) = label.strip_prefix('#') {
                let fl = if n.is_empty() {
                    FootnoteLabel::AutoNumber
                } else if n == "*" {
                    FootnoteLabel::AutoSymbol
                } else {
                    FootnoteLabel::AutoNumberNamed(n.to_string())
                };
                return (Span::FootnoteReference { label: fl, source }, final_cur);
            }
            if let Ok(n) = label.parse::<u32>() {
                return (Span::FootnoteReference { label: FootnoteLabel::Numeric(n), source }, final_cur);
            }
            return (Span::CitationReference { key: label, source }, final_cur);
        }
    }
    (Span::Text("[".to_string()), after)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(text: &str) -> Vec<Span> {
        let fragment = SourceFragment { text: text.to_string(), start: 0, end: text.len(), line: 1, column: 1 };
        parse_spans(text, &fragment)
    }

    #[test]
    fn parses_strong_and_emphasis() {
        let spans = spans_of("**strong** and *em*");
        assert!(matches!(&spans[0], Span::Strong(..)));
    }

    #[test]
    fn parses_inline_literal() {
        let spans = spans_of("``code``");
        assert!(matches!(&spans[0], Span::Literal(t, _) if t == "code"));
    }

    #[test]
    fn parses_interpreted_text_with_trailing_role() {
        let spans = spans_of("`2nd`:superscript:");
        match &spans[0] {
            Span::InterpretedText { text, role, .. } => {
                assert_eq!(text, "2nd");
                assert_eq!(role.as_deref(), Some("superscript"));
            }
            other => panic!("expected interpreted text, got {other:?}"),
        }
    }

    #[test]
    fn parses_an_inline_hyperlink_with_embedded_target() {
        let spans = spans_of("`Laika <https://typelevel.org/Laika/>`_");
        match &spans[0] {
            Span::SpanLink { content, target, .. } => {
                assert_eq!(plain_text(content), "Laika");
                assert!(matches!(target, LinkTarget::External(_)));
            }
            other => panic!("expected span link, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_substitution_reference() {
        let spans = spans_of("|name|");
        assert!(matches!(&spans[0], Span::SubstitutionReference { name, .. } if name == "name"));
    }

    #[test]
    fn parses_a_footnote_reference() {
        let spans = spans_of("[1]_");
        assert!(matches!(&spans[0], Span::FootnoteReference { label: FootnoteLabel::Numeric(1), .. }));
    }

    #[test]
    fn parses_an_autonumbered_footnote_reference() {
        let spans = spans_of("[#]_");
        assert!(matches!(&spans[0], Span::FootnoteReference { label: FootnoteLabel::AutoNumber, .. }));
    }

    #[test]
    fn parses_a_citation_reference() {
        let spans = spans_of("[Knuth1984]_");
        assert!(matches!(&spans[0], Span::CitationReference { key, .. } if key == "Knuth1984"));
    }
}
