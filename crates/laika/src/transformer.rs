//! The Transformer API (§6.1): the one object application code holds onto.
//! Each method corresponds to one bullet of §6.1 directly — `parse`,
//! `parse_unresolved`, `transform`, `with_config_value`, `using`.

use std::collections::BTreeSet;

use laika_ast::{path, Block, Path};
use laika_config::ConfigValue;
use laika_markup::{DirectiveRegistry, Format, RoleRegistry};
use laika_render::{render, RenderBackend, RendererOverrides};
use laika_rewrite::{
    apply_highlighter, apply_render_phase, build_phase, check_fail_filter, resolve_phase, Filters, InvalidDocument,
    RewriteOptions,
};

use crate::bundle::{ExtensionBundle, Highlighter};
use crate::config;

/// The virtual path a single ad-hoc `parse`/`transform` call's `Document`
/// is filed under — this facade works one document at a time, so there is
/// no tree of sibling documents to key a real path against (§D's
/// "no persistence layer" non-goal keeps a document tree manager out of
/// scope; `laika-ast::DocumentTreeRoot` stays available to any caller that
/// wants to build one directly).
fn ad_hoc_path() -> Path {
    path("/document")
}

pub type Document = laika_config::Document;

/// Wires the parse/rewrite/render layers together behind §6.1's five
/// operations. Holds the config overlay and registered extensions that
/// `with_config_value`/`using` accumulate across calls.
pub struct Transformer {
    config: ConfigValue,
    directives: DirectiveRegistry,
    roles: RoleRegistry,
    rewrite_rules: Vec<crate::bundle::RewriteRule>,
    highlighter: Option<Highlighter>,
    renderer_overrides: RendererOverrides,
    filters: Filters,
}

impl Default for Transformer {
    fn default() -> Self {
        Transformer::new()
    }
}

impl Transformer {
    pub fn new() -> Self {
        Transformer {
            config: ConfigValue::empty_object(),
            directives: DirectiveRegistry::new(),
            roles: RoleRegistry::new(),
            rewrite_rules: Vec::new(),
            highlighter: None,
            renderer_overrides: RendererOverrides::new(),
            filters: Filters::default(),
        }
    }

    /// Overrides the render-filter/fail-filter pair (§4.5/§7); `Transformer`
    /// starts with the spec's documented defaults (render warnings and
    /// below, fail on errors and above).
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Sets a configuration value programmatically (§6.1), tagged
    /// `Origin::Api` so resolver diagnostics can tell it apart from a
    /// file-sourced setting.
    pub fn with_config_value(mut self, key: &str, value: ConfigValue) -> Self {
        config::set_path(&mut self.config, key, value);
        self
    }

    /// Registers an extension bundle's directives, roles, rewrite rules and
    /// renderer overrides (§6.1/§9); later bundles win on a name collision,
    /// earlier bundles' rewrite rules and renderer overrides run first.
    pub fn using(mut self, bundle: ExtensionBundle) -> Self {
        self.directives.merge(bundle.directives);
        self.roles.merge(bundle.roles);
        self.rewrite_rules.extend(bundle.rewrite_rules);
        if bundle.highlighter.is_some() {
            self.highlighter = bundle.highlighter;
        }
        self.renderer_overrides = std::mem::take(&mut self.renderer_overrides).merge(bundle.renderer_overrides);
        self
    }

    fn autosectionnumbering(&self) -> bool {
        laika_config::resolve(&self.config, "laika.autosectionnumbering")
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn known_paths(&self) -> BTreeSet<Path> {
        BTreeSet::new()
    }

    /// Parses `input` only; doesn't run the rewrite engine at all, so link/
    /// substitution/footnote/citation references are left exactly as the
    /// front end produced them (§6.1: "parse only; skip rewrite").
    pub fn parse_unresolved(&self, format: Format, input: &str) -> Document {
        let root = laika_markup::parse_with(format, input, &self.directives);
        laika_config::Document::new(ad_hoc_path(), root, self.config.clone())
    }

    /// Parses `input` and runs the Resolve phase only (§6.1): link,
    /// substitution, footnote/citation and text-role resolution, but no
    /// section nesting/numbering and no format-specific filtering.
    pub fn parse(&self, format: Format, input: &str) -> Document {
        let root = laika_markup::parse_with(format, input, &self.directives);
        let Block::RootElement(blocks) = root else {
            return laika_config::Document::new(ad_hoc_path(), root, self.config.clone());
        };
        let resolved = resolve_phase(blocks, &self.roles);
        laika_config::Document::new(ad_hoc_path(), Block::RootElement(resolved), self.config.clone())
    }

    /// Runs the full pipeline: parse, Resolve, Build, any registered
    /// rewrite rules, Render(format), invalid-element fail-filter, then the
    /// renderer itself (§6.1).
    pub fn transform(
        &self,
        format: Format,
        input: &str,
        backend: &dyn RenderBackend,
    ) -> Result<String, InvalidDocument> {
        let output_format = backend.output_format().to_string();
        let root = laika_markup::parse_with(format, input, &self.directives);
        let Block::RootElement(blocks) = root else {
            return Ok(render(&root, backend, &self.renderer_overrides, &laika_ast::StyleDeclarationSet::new()));
        };

        let blocks = resolve_phase(blocks, &self.roles);
        let options = RewriteOptions {
            autosectionnumbering: self.autosectionnumbering(),
            known_paths: self.known_paths(),
        };
        let blocks = build_phase(blocks, &options);
        let blocks = match &self.highlighter {
            Some(highlighter) => apply_highlighter(blocks, highlighter.as_ref()),
            None => blocks,
        };
        let blocks = self
            .rewrite_rules
            .iter()
            .fold(blocks, |blocks, rule| rule(blocks));
        let blocks = apply_render_phase(blocks, &output_format);

        check_fail_filter(&blocks, &self.filters)?;

        let root = Block::RootElement(blocks);
        let styles = laika_ast::StyleDeclarationSet::new();
        Ok(render(&root, backend, &self.renderer_overrides, &styles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_render::HtmlRenderer;

    #[test]
    fn transform_renders_bold_followed_by_text_to_html() {
        let transformer = Transformer::new();
        let html = transformer.transform(Format::Markdown, "**text** rest\n", &HtmlRenderer).unwrap();
        assert_eq!(html, "<p><strong>text</strong> rest</p>");
    }

    #[test]
    fn transform_resolves_a_link_reference() {
        let transformer = Transformer::new();
        let html = transformer
            .transform(Format::Markdown, "[link][id]\n\n[id]: http://foo/\n", &HtmlRenderer)
            .unwrap();
        assert!(html.contains(r#"<a href="http://foo/">link</a>"#));
    }

    #[test]
    fn transform_fails_on_unresolved_link_references_by_default() {
        let transformer = Transformer::new();
        let err = transformer
            .transform(Format::Markdown, "[invalid1]\n\nText\n\n[invalid2]\n", &HtmlRenderer)
            .unwrap_err();
        assert_eq!(err.elements.len(), 2);
        assert!(err.elements[0].message.contains("invalid1"));
        assert!(err.elements[1].message.contains("invalid2"));
    }

    #[test]
    fn with_config_value_enables_section_auto_numbering() {
        let transformer = Transformer::new().with_config_value("laika.autosectionnumbering", config::api_bool(true));
        let doc = transformer.parse_unresolved(Format::Markdown, "# One\n\npara\n");
        let Block::RootElement(blocks) = doc.content else { panic!("expected root element") };
        let resolved = resolve_phase(blocks, &RoleRegistry::new());
        let options = RewriteOptions { autosectionnumbering: true, known_paths: BTreeSet::new() };
        let built = build_phase(resolved, &options);
        match &built[0] {
            Block::Section { options, .. } => assert_eq!(options.id.as_deref(), Some("section-1")),
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn transform_runs_a_registered_highlighter_over_code_blocks() {
        let bundle = crate::bundle::ExtensionBundle::new().with_highlighter(|lang, code| {
            vec![laika_ast::Span::Literal(code.to_string(), laika_ast::Options::with_styles([format!("tok-{lang}")]))]
        });
        let transformer = Transformer::new().using(bundle);
        let html = transformer
            .transform(Format::Markdown, "```rust\nfn x() {}\n```\n", &HtmlRenderer)
            .unwrap();
        assert_eq!(html, r#"<pre><code class="language-rust"><span class="tok-rust">fn x() {}</span></code></pre>"#);
    }

    #[test]
    fn parse_unresolved_leaves_link_references_unresolved() {
        let transformer = Transformer::new();
        let doc = transformer.parse_unresolved(Format::Markdown, "[link][id]\n");
        let Block::RootElement(blocks) = doc.content else { panic!("expected root element") };
        match &blocks[0] {
            Block::Paragraph(spans, _) => {
                assert!(matches!(spans[0], laika_ast::Span::LinkIdReference { .. }))
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }
}
