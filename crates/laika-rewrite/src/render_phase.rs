//! The Render(format) phase (§4.5): the last rewrite pass, run once the
//! target output format is known. Today this is exactly one rule: drop
//! `RawContent` spans whose `formats` list doesn't name the active format,
//! per the doc comment on `Span::RawContent` ("renderers for other formats
//! drop it"). Spans that survive are left untouched for the renderer.

use laika_ast::{rewrite_spans_in_blocks, Action, Block, Span};

/// Filters `RawContent` spans by `output_format`; every other span passes
/// through unchanged. Dropped raw content is removed outright rather than
/// replaced with an `Invalid` node — omitting a raw passthrough for a format
/// it never targeted is expected behavior, not an error (§4.5).
pub fn apply_render_phase(blocks: Vec<Block>, output_format: &str) -> Vec<Block> {
    let strip = |span: &Span| -> Action<Span> {
        match span {
            Span::RawContent { formats, .. } if !formats.iter().any(|f| f == output_format) => {
                Action::ReplaceMany(vec![])
            }
            _ => Action::Retain,
        }
    };
    rewrite_spans_in_blocks(blocks, &strip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_ast::Options;

    fn raw(formats: &[&str]) -> Span {
        Span::RawContent {
            formats: formats.iter().map(|f| f.to_string()).collect(),
            content: "<b>hi</b>".to_string(),
            options: Options::empty(),
        }
    }

    #[test]
    fn keeps_raw_content_targeting_the_active_format() {
        let tree = vec![Block::Paragraph(vec![raw(&["html"]), Span::text(" tail")], Options::empty())];
        let rendered = apply_render_phase(tree, "html");
        match &rendered[0] {
            Block::Paragraph(spans, _) => assert_eq!(spans.len(), 2),
            _ => panic!(),
        }
    }

    #[test]
    fn drops_raw_content_not_targeting_the_active_format() {
        let tree = vec![Block::Paragraph(vec![raw(&["latex"]), Span::text(" tail")], Options::empty())];
        let rendered = apply_render_phase(tree, "html");
        match &rendered[0] {
            Block::Paragraph(spans, _) => assert_eq!(spans.len(), 1),
            _ => panic!(),
        }
    }

    #[test]
    fn a_raw_content_span_can_target_multiple_formats() {
        let tree = vec![Block::Paragraph(vec![raw(&["html", "latex"])], Options::empty())];
        assert_eq!(apply_render_phase(tree.clone(), "html"), tree.clone());
        assert_eq!(apply_render_phase(tree.clone(), "latex"), tree);
    }
}
