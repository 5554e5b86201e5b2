//! The rewrite engine (L6, §4.5): the ordered Resolve → Build → Render(format)
//! pipeline that runs on a parsed tree before a renderer ever sees it, plus
//! the invalid-element policy (§4.5's render-filter/fail-filter pair) that
//! brackets the whole thing.
//!
//! Each phase is a plain `Vec<Block> -> Vec<Block>` transform built from the
//! rewrite rules in [`resolve`] and [`build`]; none of them touch I/O or
//! config directly; [`laika_config`] values feed in through plain
//! parameters ([`RewriteOptions`]) rather than the phases reading config
//! themselves, so each rule stays testable on a bare tree.

pub mod build;
pub mod filter;
pub mod render_phase;
pub mod resolve;

use laika_ast::Block;
use laika_markup::RoleRegistry;

pub use build::{apply_highlighter, generate_toc, nest_sections, number_sections, resolve_internal_targets, TocEntry};
pub use filter::{check_fail_filter, collect_invalid, Filters, InvalidDocument, InvalidElementInfo};
pub use render_phase::apply_render_phase;
pub use resolve::{
    resolve_footnotes_and_citations, resolve_interpreted_text, resolve_links, resolve_substitutions,
};

/// Knobs the rewrite engine needs that aren't derivable from the tree alone;
/// callers build this from resolved `laika-config` values (§4.6/§C.5).
#[derive(Clone, Debug, Default)]
pub struct RewriteOptions {
    pub autosectionnumbering: bool,
    pub known_paths: std::collections::BTreeSet<laika_ast::Path>,
}

/// Runs the Resolve phase (§4.5): link, substitution, footnote/citation, and
/// interpreted-text-role resolution, in that order — substitutions are
/// expanded before footnote/citation scanning so a substitution that itself
/// expands to a footnote reference still resolves, and roles run last since
/// they only ever touch spans the earlier passes leave alone.
pub fn resolve_phase(blocks: Vec<Block>, roles: &RoleRegistry) -> Vec<Block> {
    let blocks = resolve_links(blocks);
    let blocks = resolve_substitutions(blocks);
    let blocks = resolve_footnotes_and_citations(blocks);
    resolve_interpreted_text(blocks, roles)
}

/// Runs the Build phase (§4.5): section nesting, optional auto-numbering,
/// then internal navigation-link resolution, which depends on the
/// now-assigned section ids being present in `options.known_paths`.
pub fn build_phase(blocks: Vec<Block>, options: &RewriteOptions) -> Vec<Block> {
    let blocks = nest_sections(blocks);
    let blocks = number_sections(blocks, options.autosectionnumbering);
    resolve_internal_targets(blocks, &options.known_paths)
}

/// Runs the full Resolve → Build → Render(format) pipeline over an already
/// parsed (but still unresolved) tree, unwrapping and re-wrapping the
/// `Block::RootElement` the parser produces (§4.3).
pub fn rewrite(
    root: Block,
    roles: &RoleRegistry,
    options: &RewriteOptions,
    output_format: &str,
) -> Block {
    let Block::RootElement(blocks) = root else {
        return root;
    };
    let blocks = resolve_phase(blocks, roles);
    let blocks = build_phase(blocks, options);
    let blocks = apply_render_phase(blocks, output_format);
    Block::RootElement(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_ast::{LinkTarget, Options, Span};

    #[test]
    fn rewrite_resolves_links_nests_sections_and_filters_raw_content() {
        let root = Block::RootElement(vec![
            Block::Header { level: 1, content: vec![Span::text("Title")], options: Options::empty() },
            Block::Paragraph(
                vec![
                    Span::LinkIdReference {
                        id: "ref".to_string(),
                        content: vec![Span::text("link")],
                        source: laika_ast::SourceFragment::synthetic("[link][ref]"),
                    },
                    Span::RawContent {
                        formats: vec!["latex".to_string()],
                        content: "\\relax".to_string(),
                        options: Options::empty(),
                    },
                ],
                Options::empty(),
            ),
            Block::LinkDefinition {
                id: "ref".to_string(),
                target: LinkTarget::External("https://example.com".to_string()),
                title: None,
            },
        ]);

        let roles = RoleRegistry::new();
        let options = RewriteOptions::default();
        let rewritten = rewrite(root, &roles, &options, "html");

        let Block::RootElement(blocks) = rewritten else { panic!("expected root element") };
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Section { content, .. } => match &content[0] {
                Block::Paragraph(spans, _) => {
                    assert_eq!(spans.len(), 1);
                    assert!(matches!(spans[0], Span::SpanLink { .. }));
                }
                other => panic!("expected paragraph, got {other:?}"),
            },
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn rewrite_is_idempotent_on_an_already_rewritten_tree() {
        let root = Block::RootElement(vec![Block::Paragraph(vec![Span::text("plain")], Options::empty())]);
        let roles = RoleRegistry::new();
        let options = RewriteOptions::default();
        let once = rewrite(root, &roles, &options, "html");
        let twice = rewrite(once.clone(), &roles, &options, "html");
        assert_eq!(once, twice);
    }
}
