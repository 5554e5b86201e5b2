//! Parameterized scenario tests running the same assertion across
//! Markdown and reStructuredText inputs that should produce equivalent AST
//! shapes (§B.4: the teacher's `rstest` convention applied to the two
//! front ends this crate ships).

use laika_markup::{parse, Format};
use laika_ast::{Block, Span};
use rstest::rstest;

#[rstest]
#[case::markdown(Format::Markdown, "**bold** text")]
#[case::rst(Format::Rst, "**bold** text")]
fn strong_text_wraps_the_marked_run_regardless_of_host_language(#[case] format: Format, #[case] input: &str) {
    let root = parse(format, input);
    let Block::RootElement(blocks) = root else { panic!("expected root element") };
    let Block::Paragraph(spans, _) = &blocks[0] else { panic!("expected paragraph") };
    assert!(matches!(spans[0], Span::Strong(..)), "expected a Strong span in {spans:?}");
}

#[rstest]
#[case::markdown(Format::Markdown, "plain text, no markup")]
#[case::rst(Format::Rst, "plain text, no markup")]
fn a_plain_line_parses_to_a_single_paragraph_with_one_text_span(#[case] format: Format, #[case] input: &str) {
    let root = parse(format, input);
    let Block::RootElement(blocks) = root else { panic!("expected root element") };
    assert_eq!(blocks.len(), 1);
    let Block::Paragraph(spans, _) = &blocks[0] else { panic!("expected paragraph") };
    assert_eq!(spans.len(), 1);
    assert!(matches!(&spans[0], Span::Text(t) if t.contains("plain text, no markup")));
}
