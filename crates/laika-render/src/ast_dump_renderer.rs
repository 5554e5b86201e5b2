//! The AST-dump renderer (§8: "`parse(render_ast(parse(input))) ==
//! parse(input)`"). The dump format itself already lives in
//! `laika-markup::ast_dump` since it's shared between this renderer and any
//! future test fixture that wants to hand-author a tree; this module is
//! just the thin `RenderBackend` wrapper §6.2's renderer-hook interface
//! expects.

use laika_ast::{Block, Span};

use crate::{Formatter, RenderBackend};

#[derive(Clone, Copy, Debug, Default)]
pub struct AstDumpRenderer;

impl RenderBackend for AstDumpRenderer {
    fn output_format(&self) -> &str {
        "ast-dump"
    }

    /// Ignores `fmt`'s indentation/override machinery entirely: the dump
    /// format's own writer already walks the full tree in one pass, and
    /// running it per-node through `Formatter::child` would double-indent
    /// and defeat `laika_markup::ast_dump::parse_ast_dump`'s parser.
    fn default_block(&self, _fmt: &mut Formatter, block: &Block) -> String {
        laika_markup::ast_dump::dump_blocks(std::slice::from_ref(block))
    }

    fn default_span(&self, _fmt: &mut Formatter, span: &Span) -> String {
        let wrapped = Block::Paragraph(vec![span.clone()], laika_ast::Options::empty());
        laika_markup::ast_dump::dump_blocks(std::slice::from_ref(&wrapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, RendererOverrides};
    use laika_ast::{Options, StyleDeclarationSet};
    use laika_markup::ast_dump::parse_ast_dump;

    #[test]
    fn round_trips_a_paragraph_through_the_renderer_and_back_through_the_parser() {
        let tree = vec![Block::Paragraph(vec![Span::text("hello")], Options::empty())];
        let dumped = render(
            &Block::RootElement(tree.clone()),
            &AstDumpRenderer,
            &RendererOverrides::new(),
            &StyleDeclarationSet::new(),
        );
        let parsed = parse_ast_dump(&dumped);
        let Block::RootElement(reparsed) = &parsed[0] else { panic!("expected a root element") };
        assert_eq!(reparsed, &tree);
    }
}
