//! The renderer hook interface (L7, §6.2): the `Formatter` a renderer
//! function is given, override composition, and two concrete renderers —
//! an AST-dump renderer (§8's round-trip property) and a small illustrative
//! HTML renderer (§C.2: "illustrative, not a competing spec subject").

pub mod ast_dump_renderer;
pub mod formatter;
pub mod html;
pub mod overrides;

pub use ast_dump_renderer::AstDumpRenderer;
pub use formatter::Formatter;
pub use html::HtmlRenderer;
pub use overrides::RendererOverrides;

use laika_ast::{Block, Span, StyleDeclarationSet};

/// One concrete output format's default rendering rules (§6.2): every
/// `RenderBackend` supplies a total function over every `Block`/`Span`
/// variant, so `Formatter::child`/`span` always have a fallback once
/// overrides are exhausted.
pub trait RenderBackend {
    fn output_format(&self) -> &str;
    fn default_block(&self, fmt: &mut Formatter, block: &Block) -> String;
    fn default_span(&self, fmt: &mut Formatter, span: &Span) -> String;
}

/// Runs `backend` over `root` with `overrides` layered in front of its
/// defaults and `styles` available to the cascade (§4.7). `root` is
/// expected to be a `Block::RootElement`, as every parser produces, but any
/// block renders correctly as the top of the tree.
pub fn render(
    root: &Block,
    backend: &dyn RenderBackend,
    overrides: &RendererOverrides,
    styles: &StyleDeclarationSet,
) -> String {
    let output_format = backend.output_format().to_string();
    let mut fmt = Formatter::new(&output_format, backend, overrides, styles);
    fmt.child(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_ast::Options;

    #[test]
    fn render_dispatches_to_the_backend_default_when_no_override_matches() {
        let root = Block::Paragraph(vec![Span::text("hi")], Options::empty());
        let backend = HtmlRenderer;
        let overrides = RendererOverrides::new();
        let styles = StyleDeclarationSet::new();
        let out = render(&root, &backend, &overrides, &styles);
        assert_eq!(out, "<p>hi</p>");
    }

    #[test]
    fn an_override_preempts_the_backend_default() {
        let root = Block::Paragraph(vec![Span::text("hi")], Options::empty());
        let backend = HtmlRenderer;
        let overrides = RendererOverrides::new()
            .on_block(|_fmt, block| match block {
                Block::Paragraph(..) => Some("<custom/>".to_string()),
                _ => None,
            });
        let styles = StyleDeclarationSet::new();
        let out = render(&root, &backend, &overrides, &styles);
        assert_eq!(out, "<custom/>");
    }
}
