//! A minimal HTML renderer (§C.2): illustrative coverage of the core
//! element set named in §3.3 — headings, paragraphs, lists, quotes, code,
//! tables, links, images, emphasis/strong — with no CSS or theme assets.
//! Not a competing spec subject; real output fidelity belongs to a full
//! renderer built against this same `Formatter` hook.

use laika_ast::{Alignment, Block, CellKind, EnumFormat, LinkTarget, Span};

use crate::{Formatter, RenderBackend};

#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

impl RenderBackend for HtmlRenderer {
    fn output_format(&self) -> &str {
        "html"
    }

    fn default_block(&self, fmt: &mut Formatter, block: &Block) -> String {
        match block {
            Block::Paragraph(spans, _) => {
                let content = fmt.spans(spans);
                fmt.text_element("p", &[], &content)
            }
            Block::Header { level, content, .. } => {
                let tag = format!("h{}", (*level).clamp(1, 6));
                let text = fmt.spans(content);
                fmt.text_element(&tag, &[], &text)
            }
            Block::Title(spans, _) => {
                let text = fmt.spans(spans);
                fmt.text_element("h1", &[], &text)
            }
            Block::BulletList { items, .. } => {
                let rendered = items
                    .iter()
                    .map(|item| {
                        let inner = fmt.children(&item.content);
                        fmt.indented_element("li", &[], &inner)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                fmt.indented_element("ul", &[], &rendered)
            }
            Block::EnumList { items, start, format, .. } => {
                let mut attrs = Vec::new();
                if *start != 1 {
                    attrs.push(("start".to_string(), start.to_string()));
                }
                if let Some(kind) = enum_format_type(*format) {
                    attrs.push(("type".to_string(), kind.to_string()));
                }
                let rendered = items
                    .iter()
                    .map(|item| {
                        let inner = fmt.children(&item.content);
                        fmt.indented_element("li", &[], &inner)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                fmt.indented_element("ol", &attrs, &rendered)
            }
            Block::DefinitionList { items, .. } => {
                let rendered = items
                    .iter()
                    .map(|item| {
                        let term = fmt.without_indentation(|f| f.spans(&item.term));
                        let dt = fmt.text_element("dt", &[], &term);
                        let dd_inner = fmt.children(&item.definition);
                        let dd = fmt.indented_element("dd", &[], &dd_inner);
                        format!("{dt}\n{dd}")
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                fmt.indented_element("dl", &[], &rendered)
            }
            Block::QuotedBlock { content, attribution, .. } => {
                let inner = fmt.children(content);
                let body = if attribution.is_empty() {
                    inner
                } else {
                    let cite = fmt.without_indentation(|f| f.spans(attribution));
                    format!("{inner}\n{}", fmt.text_element("footer", &[], &cite))
                };
                fmt.indented_element("blockquote", &[], &body)
            }
            Block::LiteralBlock(text, _) => {
                let escaped = html_escape::encode_text(text);
                fmt.text_element("pre", &[], &escaped)
            }
            Block::CodeBlock { lang, spans, .. } => {
                let attrs = lang
                    .as_ref()
                    .map(|l| vec![("class".to_string(), format!("language-{l}"))])
                    .unwrap_or_default();
                let code = fmt.without_indentation(|f| f.spans(spans));
                let inner = fmt.text_element("code", &attrs, &code);
                fmt.text_element("pre", &[], &inner)
            }
            Block::Table { head, body, .. } => {
                let thead = if head.is_empty() {
                    String::new()
                } else {
                    let rows = render_table_rows(fmt, head);
                    format!("{}\n", fmt.indented_element("thead", &[], &rows))
                };
                let tbody_rows = render_table_rows(fmt, body);
                let tbody = fmt.indented_element("tbody", &[], &tbody_rows);
                fmt.indented_element("table", &[], &format!("{thead}{tbody}"))
            }
            Block::Rule(_) => "<hr/>".to_string(),
            Block::Section { header, content, options } => {
                let id_attr = options
                    .id
                    .as_ref()
                    .map(|id| vec![("id".to_string(), id.clone())])
                    .unwrap_or_default();
                let header_html = fmt.child(header);
                let body = fmt.children(content);
                let inner = format!("{header_html}\n{body}");
                fmt.indented_element("section", &id_attr, &inner)
            }
            Block::BlockSequence(children, _) => fmt.children(children),
            Block::RootElement(children) => fmt.children(children),
            Block::Footnote { label, content, options } => {
                let id_attr = options
                    .id
                    .as_ref()
                    .map(|id| vec![("id".to_string(), id.clone())])
                    .unwrap_or_default();
                let marker = footnote_marker(label);
                let inner = fmt.children(content);
                fmt.indented_element("aside", &id_attr, &format!("<sup>{marker}</sup>\n{inner}"))
            }
            Block::Citation { key, content, .. } => {
                let inner = fmt.children(content);
                fmt.indented_element("aside", &[("id".to_string(), key.clone())], &inner)
            }
            Block::LinkDefinition { .. } | Block::SubstitutionDefinition { .. } => String::new(),
            Block::TemplateRoot(_) => String::new(),
            Block::Invalid(invalid) => {
                let escaped = html_escape::encode_text(&invalid.message);
                fmt.text_element("span", &[("class".to_string(), "invalid".to_string())], &escaped)
            }
        }
    }

    fn default_span(&self, fmt: &mut Formatter, span: &Span) -> String {
        match span {
            Span::Text(text) => html_escape::encode_text(text).to_string(),
            Span::Emphasized(spans, _) => {
                let inner = fmt.spans(spans);
                format!("<em>{inner}</em>")
            }
            Span::Strong(spans, _) => {
                let inner = fmt.spans(spans);
                format!("<strong>{inner}</strong>")
            }
            Span::Strikethrough(spans, _) => {
                let inner = fmt.spans(spans);
                format!("<del>{inner}</del>")
            }
            Span::Literal(text, options) => {
                let escaped = html_escape::encode_text(text);
                if options.styles.is_empty() {
                    format!("<code>{escaped}</code>")
                } else {
                    let class = options.styles.iter().cloned().collect::<Vec<_>>().join(" ");
                    format!("<span class=\"{class}\">{escaped}</span>")
                }
            }
            Span::LineBreak(_) => "<br/>".to_string(),
            Span::InlineCode { spans, .. } => {
                let inner = fmt.spans(spans);
                format!("<code>{inner}</code>")
            }
            Span::SpanLink { content, target, title, .. } => {
                let href = fmt.translate_path(target);
                let escaped_href = html_escape::encode_double_quoted_attribute(&href);
                let title_attr = title
                    .as_ref()
                    .map(|t| format!(" title=\"{}\"", html_escape::encode_double_quoted_attribute(t)))
                    .unwrap_or_default();
                let inner = fmt.spans(content);
                format!("<a href=\"{escaped_href}\"{title_attr}>{inner}</a>")
            }
            Span::Image { target, alt, title, .. } => {
                let src = fmt.translate_path(target);
                let escaped_src = html_escape::encode_double_quoted_attribute(&src);
                let alt_attr = alt
                    .as_ref()
                    .map(|a| html_escape::encode_double_quoted_attribute(a).to_string())
                    .unwrap_or_default();
                let title_attr = title
                    .as_ref()
                    .map(|t| format!(" title=\"{}\"", html_escape::encode_double_quoted_attribute(t)))
                    .unwrap_or_default();
                format!("<img src=\"{escaped_src}\" alt=\"{alt_attr}\"{title_attr}/>")
            }
            Span::RawContent { content, .. } => content.clone(),
            Span::FootnoteLink { target_id, label, .. } => {
                let escaped = html_escape::encode_text(label);
                format!("<a href=\"#{target_id}\" class=\"footnote-ref\">{escaped}</a>")
            }
            Span::CitationLink { target_id, label, .. } => {
                let escaped = html_escape::encode_text(label);
                format!("<a href=\"#{target_id}\" class=\"citation-ref\">{escaped}</a>")
            }
            Span::Invalid(invalid) => {
                let escaped = html_escape::encode_text(&invalid.message);
                format!("<span class=\"invalid\">{escaped}</span>")
            }
            // Unresolved-placeholder variants never survive the rewrite engine's
            // Resolve phase in a well-formed pipeline (§4.5); rendering them as
            // their literal source text keeps this renderer total regardless.
            Span::UnresolvedSpanSequence(source)
            | Span::LinkIdReference { source, .. }
            | Span::SubstitutionReference { source, .. }
            | Span::FootnoteReference { source, .. }
            | Span::InterpretedText { source, .. } => html_escape::encode_text(&source.text).to_string(),
            Span::CitationReference { key, .. } => html_escape::encode_text(key).to_string(),
        }
    }
}

fn render_table_rows(fmt: &mut Formatter, rows: &[laika_ast::Row]) -> String {
    rows.iter()
        .map(|row| render_table_row(fmt, row))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table_row(fmt: &mut Formatter, row: &laika_ast::Row) -> String {
    let cells = row
        .cells
        .iter()
        .map(|cell| render_table_cell(fmt, cell))
        .collect::<Vec<_>>()
        .join("\n");
    fmt.indented_element("tr", &[], &cells)
}

fn render_table_cell(fmt: &mut Formatter, cell: &laika_ast::Cell) -> String {
    let tag = match cell.kind {
        CellKind::HeadCell => "th",
        CellKind::BodyCell => "td",
    };
    let attrs = alignment_attr(cell.align);
    let inner = fmt.children(&cell.content);
    fmt.indented_element(tag, &attrs, &inner)
}

fn alignment_attr(align: Alignment) -> Vec<(String, String)> {
    match align {
        Alignment::Left => vec![("style".to_string(), "text-align: left".to_string())],
        Alignment::Center => vec![("style".to_string(), "text-align: center".to_string())],
        Alignment::Right => vec![("style".to_string(), "text-align: right".to_string())],
        Alignment::None => vec![],
    }
}

fn enum_format_type(format: EnumFormat) -> Option<&'static str> {
    match format {
        EnumFormat::Arabic => None,
        EnumFormat::LowerAlpha => Some("a"),
        EnumFormat::UpperAlpha => Some("A"),
        EnumFormat::LowerRoman => Some("i"),
        EnumFormat::UpperRoman => Some("I"),
    }
}

fn footnote_marker(label: &laika_ast::FootnoteLabel) -> String {
    match label {
        laika_ast::FootnoteLabel::Numeric(n) => n.to_string(),
        laika_ast::FootnoteLabel::AutoNumberNamed(name) => name.clone(),
        laika_ast::FootnoteLabel::AutoNumber | laika_ast::FootnoteLabel::AutoSymbol => String::new(),
    }
}
