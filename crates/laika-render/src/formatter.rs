//! The `Formatter` hook (§6.2): what a renderer function is given to turn a
//! node into output text. It tracks indentation, the ancestor chain the
//! style cascade needs, and the callbacks that let `child`/`children`
//! recurse back into the whole render (overrides first, then the backend's
//! default) instead of each renderer hand-rolling its own recursion.

use std::collections::BTreeMap;

use laika_ast::{Block, LinkTarget, NodeDescriptor, Options, Span, StyleDeclarationSet};

use crate::overrides::RendererOverrides;
use crate::RenderBackend;

pub(crate) fn block_type_name(block: &Block) -> &'static str {
    match block {
        Block::Paragraph(..) => "paragraph",
        Block::Header { .. } => "header",
        Block::Title(..) => "title",
        Block::BulletList { .. } => "bulletList",
        Block::EnumList { .. } => "enumList",
        Block::DefinitionList { .. } => "definitionList",
        Block::QuotedBlock { .. } => "quotedBlock",
        Block::LiteralBlock(..) => "literalBlock",
        Block::CodeBlock { .. } => "codeBlock",
        Block::Table { .. } => "table",
        Block::Rule(..) => "rule",
        Block::Section { .. } => "section",
        Block::BlockSequence(..) => "blockSequence",
        Block::RootElement(..) => "rootElement",
        Block::Footnote { .. } => "footnote",
        Block::Citation { .. } => "citation",
        Block::LinkDefinition { .. } => "linkDefinition",
        Block::SubstitutionDefinition { .. } => "substitutionDefinition",
        Block::TemplateRoot(..) => "templateRoot",
        Block::Invalid(..) => "invalid",
    }
}

fn block_options(block: &Block) -> Options {
    match block {
        Block::Paragraph(_, o)
        | Block::Header { options: o, .. }
        | Block::Title(_, o)
        | Block::BulletList { options: o, .. }
        | Block::EnumList { options: o, .. }
        | Block::DefinitionList { options: o, .. }
        | Block::QuotedBlock { options: o, .. }
        | Block::LiteralBlock(_, o)
        | Block::CodeBlock { options: o, .. }
        | Block::Table { options: o, .. }
        | Block::Rule(o)
        | Block::Section { options: o, .. }
        | Block::BlockSequence(_, o)
        | Block::Footnote { options: o, .. }
        | Block::Citation { options: o, .. } => o.clone(),
        _ => Options::empty(),
    }
}

pub(crate) fn span_type_name(span: &Span) -> &'static str {
    match span {
        Span::Text(..) => "text",
        Span::Emphasized(..) => "emphasized",
        Span::Strong(..) => "strong",
        Span::Strikethrough(..) => "strikethrough",
        Span::Literal(..) => "literal",
        Span::LineBreak(..) => "lineBreak",
        Span::InlineCode { .. } => "inlineCode",
        Span::SpanLink { .. } => "spanLink",
        Span::Image { .. } => "image",
        Span::RawContent { .. } => "rawContent",
        Span::UnresolvedSpanSequence(..) => "unresolvedSpanSequence",
        Span::LinkIdReference { .. } => "linkIdReference",
        Span::SubstitutionReference { .. } => "substitutionReference",
        Span::FootnoteReference { .. } => "footnoteReference",
        Span::CitationReference { .. } => "citationReference",
        Span::InterpretedText { .. } => "interpretedText",
        Span::FootnoteLink { .. } => "footnoteLink",
        Span::CitationLink { .. } => "citationLink",
        Span::Invalid(..) => "invalid",
    }
}

fn span_options(span: &Span) -> Options {
    span.options().cloned().unwrap_or_default()
}

/// What a renderer function receives for a node (§6.2): recursion back into
/// the whole render (`child`/`children`/`span`/`spans`), indentation-aware
/// wrapping (`indented_element`/`text_element`/`without_indentation`), style
/// lookup, and path translation.
pub struct Formatter<'a> {
    pub output_format: &'a str,
    backend: &'a dyn RenderBackend,
    overrides: &'a RendererOverrides,
    styles: &'a StyleDeclarationSet,
    indent: usize,
    suspend_indent: bool,
    ancestors: Vec<NodeDescriptor>,
}

impl<'a> Formatter<'a> {
    pub(crate) fn new(
        output_format: &'a str,
        backend: &'a dyn RenderBackend,
        overrides: &'a RendererOverrides,
        styles: &'a StyleDeclarationSet,
    ) -> Self {
        Formatter {
            output_format,
            backend,
            overrides,
            styles,
            indent: 0,
            suspend_indent: false,
            ancestors: Vec::new(),
        }
    }

    /// Renders one child block: overrides are tried first, in registration
    /// order, before falling back to the backend's default (§6.2/§9's
    /// config-struct composition — no inheritance, just an ordered list).
    pub fn child(&mut self, block: &Block) -> String {
        let descriptor = NodeDescriptor::new(block_type_name(block), &block_options(block));
        let backend = self.backend;
        let overrides = self.overrides;
        self.ancestors.push(descriptor);
        let rendered = overrides
            .render_block(self, block)
            .unwrap_or_else(|| backend.default_block(self, block));
        self.ancestors.pop();
        rendered
    }

    pub fn children(&mut self, blocks: &[Block]) -> String {
        blocks.iter().map(|b| self.child(b)).collect()
    }

    pub fn span(&mut self, span: &Span) -> String {
        let descriptor = NodeDescriptor::new(span_type_name(span), &span_options(span));
        let backend = self.backend;
        let overrides = self.overrides;
        self.ancestors.push(descriptor);
        let rendered = overrides
            .render_span(self, span)
            .unwrap_or_else(|| backend.default_span(self, span));
        self.ancestors.pop();
        rendered
    }

    pub fn spans(&mut self, spans: &[Span]) -> String {
        spans.iter().map(|s| self.span(s)).collect()
    }

    /// Wraps `children` in `<tag attrs>` / `</tag>` on their own indented
    /// lines, unless indentation is currently suspended.
    pub fn indented_element(
        &mut self,
        tag: &str,
        attrs: &[(String, String)],
        children: &str,
    ) -> String {
        if self.suspend_indent || children.is_empty() {
            return self.text_element(tag, attrs, children);
        }
        let pad = "  ".repeat(self.indent);
        let inner_pad = "  ".repeat(self.indent + 1);
        let open = render_open_tag(tag, attrs);
        let indented_children = children
            .lines()
            .map(|line| format!("{inner_pad}{line}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{pad}{open}\n{indented_children}\n{pad}</{tag}>")
    }

    /// Wraps `text` in `<tag attrs>text</tag>` on a single line, with no
    /// nested indentation — for leaf elements whose content is plain text.
    pub fn text_element(&mut self, tag: &str, attrs: &[(String, String)], text: &str) -> String {
        let pad = if self.suspend_indent { String::new() } else { "  ".repeat(self.indent) };
        let open = render_open_tag(tag, attrs);
        format!("{pad}{open}{text}</{tag}>")
    }

    /// Runs `f` with indentation suspended — for content (inline spans,
    /// preformatted text) that must render on a single line regardless of
    /// the surrounding block's nesting depth.
    pub fn without_indentation<F: FnOnce(&mut Self) -> String>(&mut self, f: F) -> String {
        let was = self.suspend_indent;
        self.suspend_indent = true;
        let result = f(self);
        self.suspend_indent = was;
        result
    }

    /// Runs `f` one indentation level deeper.
    pub fn indented<F: FnOnce(&mut Self) -> String>(&mut self, f: F) -> String {
        self.indent += 1;
        let result = f(self);
        self.indent -= 1;
        result
    }

    /// Resolves a link/image target to the string a renderer should emit
    /// (§6.2's `translate_path`): external targets pass through verbatim,
    /// internal ones resolve to their relative path.
    pub fn translate_path(&self, target: &LinkTarget) -> String {
        match target {
            LinkTarget::External(url) => url.clone(),
            LinkTarget::Internal(path) => path.as_str().to_string(),
        }
    }

    /// The cascade-resolved style properties for the node currently being
    /// rendered (§4.7); `child`/`span` push the node's descriptor onto the
    /// ancestor stack before invoking the renderer, so this always reflects
    /// the innermost node.
    pub fn current_styles(&self) -> BTreeMap<String, String> {
        match self.ancestors.split_last() {
            Some((node, ancestors)) => self.styles.styles_for(node, ancestors),
            None => BTreeMap::new(),
        }
    }
}

fn render_open_tag(tag: &str, attrs: &[(String, String)]) -> String {
    if attrs.is_empty() {
        format!("<{tag}>")
    } else {
        let rendered_attrs = attrs
            .iter()
            .map(|(k, v)| format!(" {k}=\"{v}\""))
            .collect::<String>();
        format!("<{tag}{rendered_attrs}>")
    }
}
