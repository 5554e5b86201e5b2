//! Markup front ends (L3): Markdown/GFM and reStructuredText block and span
//! grammars, the directive and text-role frameworks they both resolve
//! against, and the two-pass orchestration (`parse_unresolved` then
//! `parse`) that ties a host language's block pass to its span pass.
//!
//! Every front end follows the same shape: a block pass walks
//! [`line::Line`]s and produces a tree whose inline regions are
//! `Span::UnresolvedSpanSequence` placeholders (§4.3); a later span pass
//! expands each placeholder via [`laika_ast::rewrite_spans_in_blocks`].
//! Directive calls (`@:name(...) { body }`, §4.4) are resolved during the
//! block pass itself, against a [`directive::DirectiveRegistry`] the caller
//! builds up from whichever extension bundles are active.

pub mod ast_dump;
pub mod directive;
pub mod inline;
pub mod line;
pub mod markdown;
pub mod role;
pub mod rst;
pub mod whitespace;

use laika_ast::{rewrite_spans_in_blocks, Action, Block, Span};

pub use directive::DirectiveRegistry;
pub use role::RoleRegistry;

/// Which host markup language a document is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Markdown,
    Rst,
}

impl Format {
    /// Recognizes the file extensions `laika-cli` and the facade crate's
    /// directory transformer dispatch on (§4.1's format-per-file-suffix
    /// convention); `None` for anything else.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Format::Markdown),
            "rst" => Some(Format::Rst),
            _ => None,
        }
    }
}

/// Parses `input` into a `Block::RootElement` whose leaves still carry
/// `Span::UnresolvedSpanSequence` placeholders, resolving no directives.
pub fn parse_unresolved(format: Format, input: &str) -> Block {
    let empty = DirectiveRegistry::new();
    parse_unresolved_with(format, input, &empty)
}

/// As [`parse_unresolved`], but resolving directive calls against
/// `registry`.
pub fn parse_unresolved_with(format: Format, input: &str, registry: &DirectiveRegistry) -> Block {
    let preprocessed = whitespace::preprocess(input, whitespace::DEFAULT_TAB_WIDTH);
    match format {
        Format::Markdown => markdown::parse_root_with(&preprocessed, registry),
        Format::Rst => rst::parse_root_with(&preprocessed, registry),
    }
}

/// Parses `input` all the way through the span pass: every
/// `Span::UnresolvedSpanSequence` placeholder is expanded into the concrete
/// (still possibly unresolved-*reference*) spans the host language's span
/// grammar produces. Link/substitution/footnote reference resolution and
/// directive-body span parsing beyond this point belong to the rewrite
/// engine (L6), not here.
pub fn parse(format: Format, input: &str) -> Block {
    let empty = DirectiveRegistry::new();
    parse_with(format, input, &empty)
}

/// As [`parse`], but resolving directive calls against `registry`.
pub fn parse_with(format: Format, input: &str, registry: &DirectiveRegistry) -> Block {
    let preprocessed = whitespace::preprocess(input, whitespace::DEFAULT_TAB_WIDTH);
    let root = match format {
        Format::Markdown => markdown::parse_root_with(&preprocessed, registry),
        Format::Rst => rst::parse_root_with(&preprocessed, registry),
    };
    let Block::RootElement(blocks) = root else {
        unreachable!("parse_root_with always returns a RootElement")
    };

    let expand_spans = |span: &Span| -> Action<Span> {
        match span {
            Span::UnresolvedSpanSequence(fragment) => {
                let spans = match format {
                    Format::Markdown => markdown::span::parse_spans(&preprocessed, fragment),
                    Format::Rst => rst::span::parse_spans(&preprocessed, fragment),
                };
                Action::ReplaceMany(spans)
            }
            _ => Action::Retain,
        }
    };
    Block::RootElement(rewrite_spans_in_blocks(blocks, &expand_spans))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_markdown_and_rst_extensions() {
        assert_eq!(Format::from_extension("md"), Some(Format::Markdown));
        assert_eq!(Format::from_extension("MARKDOWN"), Some(Format::Markdown));
        assert_eq!(Format::from_extension("rst"), Some(Format::Rst));
        assert_eq!(Format::from_extension("txt"), None);
    }

    #[test]
    fn parse_expands_unresolved_span_sequences_in_a_markdown_paragraph() {
        let root = parse(Format::Markdown, "Hello **world**\n");
        let Block::RootElement(blocks) = root else { panic!("expected root element") };
        match &blocks[0] {
            Block::Paragraph(spans, _) => {
                assert!(spans.iter().any(|s| matches!(s, Span::Strong(..))));
                assert!(!spans.iter().any(|s| matches!(s, Span::UnresolvedSpanSequence(_))));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn parse_expands_unresolved_span_sequences_in_an_rst_paragraph() {
        let root = parse(Format::Rst, "Hello *emphasis*\n");
        let Block::RootElement(blocks) = root else { panic!("expected root element") };
        match &blocks[0] {
            Block::Paragraph(spans, _) => {
                assert!(spans.iter().any(|s| matches!(s, Span::Emphasized(..))));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn parse_unresolved_leaves_placeholders_in_place() {
        let root = parse_unresolved(Format::Markdown, "plain text\n");
        let Block::RootElement(blocks) = root else { panic!("expected root element") };
        match &blocks[0] {
            Block::Paragraph(spans, _) => {
                assert!(matches!(spans.as_slice(), [Span::UnresolvedSpanSequence(_)]));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }
}
