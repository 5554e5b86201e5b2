//! Small helpers shared by both markup languages' span parsers.

use std::sync::OnceLock;

use laika_ast::{LinkTarget, Options, Span};
use regex::Regex;

/// Bare `http(s)://` URIs and `name@host` mentions, recognized as autolinks
/// at a safe text boundary without needing `<...>` delimiters (§4.3's GFM
/// addition, §6.3's autolink boundary contract).
fn autolink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?x)
            (?P<url>https?://[^\s<>"']+)
            |
            (?P<email>[[:alnum:]][[:alnum:]._+-]*@[[:alnum:]-]+(?:\.[[:alnum:]-]+)+)
        "#)
        .expect("static autolink regex is valid")
    })
}

/// GFM's "safe boundary" rule trims sentence punctuation and closing
/// brackets off the end of a match rather than treating them as part of
/// the URI — `(see http://example.com).` keeps the trailing `).` as text.
fn trim_autolink_trailing(matched: &str) -> &str {
    let mut end = matched.len();
    while end > 0 {
        let c = matched[..end].chars().next_back().unwrap();
        if matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '\'' | '"') {
            end -= c.len_utf8();
        } else {
            break;
        }
    }
    &matched[..end]
}

/// Scans `text` (a run with no other special characters in it) for
/// autolinks, splitting it into plain-text and `SpanLink` spans around any
/// match found.
fn push_autolinks(spans: &mut Vec<Span>, text: &str) {
    let mut last = 0;
    for m in autolink_regex().find_iter(text) {
        let matched = trim_autolink_trailing(m.as_str());
        if matched.is_empty() {
            continue;
        }
        if m.start() > last {
            spans.push(Span::Text(text[last..m.start()].to_string()));
        }
        let target = if matched.starts_with("http://") || matched.starts_with("https://") {
            LinkTarget::External(matched.to_string())
        } else {
            LinkTarget::External(format!("mailto:{matched}"))
        };
        spans.push(Span::SpanLink {
            content: vec![Span::Text(matched.to_string())],
            target,
            title: None,
            options: Options::empty(),
        });
        last = m.start() + matched.len();
    }
    if last < text.len() {
        spans.push(Span::Text(text[last..].to_string()));
    }
}

/// Splits a plain-text run on embedded newlines: two-or-more trailing
/// spaces before a newline become a hard [`Span::LineBreak`]; a bare
/// newline becomes a single space (a soft break), matching how the block
/// pass joins wrapped lines of a paragraph back into one fragment. Each
/// resulting chunk is then scanned for autolinks.
pub fn push_text(spans: &mut Vec<Span>, text: &str) {
    let mut rest = text;
    loop {
        match rest.find('\n') {
            Some(nl) => {
                let before = &rest[..nl];
                let trimmed = before.trim_end_matches(' ');
                let trailing_spaces = before.len() - trimmed.len();
                if trailing_spaces >= 2 {
                    if !trimmed.is_empty() {
                        push_autolinks(spans, trimmed);
                    }
                    spans.push(Span::LineBreak(Options::empty()));
                } else if !trimmed.is_empty() || !spans.is_empty() {
                    push_autolinks(spans, &format!("{trimmed} "));
                }
                rest = &rest[nl + 1..];
            }
            None => {
                if !rest.is_empty() {
                    push_autolinks(spans, rest);
                }
                return;
            }
        }
    }
}

/// Concatenates the literal text of a span run, ignoring any non-`Text`
/// spans — used to synthesize a plain-text label for a reference id.
pub fn plain_text(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|s| match s {
            Span::Text(t) => t.clone(),
            _ => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_bare_url_becomes_a_span_link() {
        let mut spans = Vec::new();
        push_text(&mut spans, "see http://example.com/path for details");
        assert!(matches!(&spans[0], Span::Text(t) if t == "see "));
        match &spans[1] {
            Span::SpanLink { target: LinkTarget::External(url), .. } => assert_eq!(url, "http://example.com/path"),
            other => panic!("expected span link, got {other:?}"),
        }
        assert!(matches!(&spans[2], Span::Text(t) if t.contains("for details")));
    }

    #[test]
    fn trailing_sentence_punctuation_is_not_part_of_the_autolink() {
        let mut spans = Vec::new();
        push_text(&mut spans, "(see http://example.com).");
        match &spans[1] {
            Span::SpanLink { target: LinkTarget::External(url), .. } => assert_eq!(url, "http://example.com"),
            other => panic!("expected span link, got {other:?}"),
        }
        assert!(matches!(&spans[2], Span::Text(t) if t == ")."));
    }

    #[test]
    fn a_bare_email_becomes_a_mailto_span_link() {
        let mut spans = Vec::new();
        push_text(&mut spans, "contact dev@example.com now");
        match &spans[1] {
            Span::SpanLink { target: LinkTarget::External(url), .. } => assert_eq!(url, "mailto:dev@example.com"),
            other => panic!("expected span link, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_with_no_autolinks_is_untouched() {
        let mut spans = Vec::new();
        push_text(&mut spans, "nothing special here");
        assert_eq!(spans, vec![Span::Text("nothing special here".to_string())]);
    }
}
