//! The Build phase (§4.5): section nesting from flat headers, optional
//! section auto-numbering, table-of-contents generation, internal
//! navigation-link resolution, and (when a bundle registers one) running a
//! syntax highlighter over fenced code blocks.
//!
//! Markdown's block grammar leaves `Header` blocks flat (§4.3); RST's
//! already nests them into `Section` during its own block pass, since
//! section membership there is implied by adornment nesting rather than an
//! explicit level number. [`nest_sections`] only ever acts on flat
//! `Header` blocks, so running it over an already-nested RST tree is a
//! no-op — the Build phase applies uniformly to both front ends either
//! way, satisfying §4.5's idempotence requirement.

use std::collections::BTreeSet;
use std::iter::Peekable;
use std::vec::IntoIter;

use laika_ast::{rewrite_blocks, rewrite_spans_in_blocks, Action, Block, LinkTarget, Options, Path, Span};
use laika_markup::inline::plain_text;

pub fn nest_sections(blocks: Vec<Block>) -> Vec<Block> {
    let mut iter = blocks.into_iter().peekable();
    build_level(&mut iter, 0)
}

fn header_level(block: &Block) -> Option<u8> {
    match block {
        Block::Header { level, .. } => Some(*level),
        _ => None,
    }
}

fn build_level(iter: &mut Peekable<IntoIter<Block>>, min_level: u8) -> Vec<Block> {
    let mut out = Vec::new();
    while let Some(block) = iter.peek() {
        match header_level(block) {
            Some(level) if level > min_level => {
                let header = iter.next().unwrap();
                let content = build_level(iter, level);
                out.push(Block::Section { header: Box::new(header), content, options: Options::empty() });
            }
            Some(_) => break,
            None => out.push(iter.next().unwrap()),
        }
    }
    out
}

/// Assigns each `Section` a hierarchical id (`section-1-2-3`) per §4.5,
/// only when `autosectionnumbering` is enabled (§C.5's config key).
pub fn number_sections(blocks: Vec<Block>, autosectionnumbering: bool) -> Vec<Block> {
    if !autosectionnumbering {
        return blocks;
    }
    number_level(blocks, &[])
}

fn number_level(blocks: Vec<Block>, prefix: &[usize]) -> Vec<Block> {
    let mut counter = 0usize;
    blocks
        .into_iter()
        .map(|block| match block {
            Block::Section { header, content, mut options } => {
                counter += 1;
                let mut path = prefix.to_vec();
                path.push(counter);
                let id = format!("section-{}", path.iter().map(usize::to_string).collect::<Vec<_>>().join("-"));
                options.id = Some(id);
                Block::Section { header, content: number_level(content, &path), options }
            }
            other => other,
        })
        .collect()
}

/// One entry in a generated table of contents: a section's header spans,
/// its (possibly auto-numbered) target id, and its nested entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub title: Vec<Span>,
    pub target_id: Option<String>,
    pub children: Vec<TocEntry>,
}

pub fn generate_toc(blocks: &[Block]) -> Vec<TocEntry> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Section { header, content, options } => {
                let title = match header.as_ref() {
                    Block::Header { content, .. } => content.clone(),
                    Block::Title(spans, _) => spans.clone(),
                    _ => vec![],
                };
                Some(TocEntry { title, target_id: options.id.clone(), children: generate_toc(content) })
            }
            _ => None,
        })
        .collect()
}

/// Replaces `SpanLink`/`Image` nodes pointing at an internal path absent
/// from `known_paths` with an `Invalid` node (§4.5's "navigation link
/// resolution"); internal targets that exist, and every external target,
/// pass through unchanged.
pub fn resolve_internal_targets(blocks: Vec<Block>, known_paths: &BTreeSet<Path>) -> Vec<Block> {
    let check = |span: &Span| -> Action<Span> {
        match span {
            Span::SpanLink { target: LinkTarget::Internal(path), .. } if !known_paths.contains(path) => {
                Action::Replace(Span::Invalid(laika_ast::Invalid::error(
                    format!("unresolved internal link target: {}", path.as_str()),
                    laika_ast::SourceFragment::synthetic(path.as_str()),
                )))
            }
            Span::Image { target: LinkTarget::Internal(path), .. } if !known_paths.contains(path) => {
                Action::Replace(Span::Invalid(laika_ast::Invalid::error(
                    format!("unresolved internal image target: {}", path.as_str()),
                    laika_ast::SourceFragment::synthetic(path.as_str()),
                )))
            }
            _ => Action::Retain,
        }
    };
    rewrite_spans_in_blocks(blocks, &check)
}

/// Runs a registered syntax highlighter over every `CodeBlock` that names a
/// `lang` (§4.3/§9's highlighting hook), replacing its plain-text span with
/// whatever spans the highlighter produces for that language and source.
/// Code blocks with no `lang`, and every block when no highlighter is
/// registered at all, keep their original plain `Text` span untouched.
pub fn apply_highlighter(blocks: Vec<Block>, highlighter: &dyn Fn(&str, &str) -> Vec<Span>) -> Vec<Block> {
    rewrite_blocks(blocks, &|block| match block {
        Block::CodeBlock { lang: Some(lang), spans, options } => {
            let code = plain_text(spans);
            Action::Replace(Block::CodeBlock {
                lang: Some(lang.clone()),
                spans: highlighter(lang, &code),
                options: options.clone(),
            })
        }
        _ => Action::Retain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(level: u8, text: &str) -> Block {
        Block::Header { level, content: vec![Span::text(text)], options: Options::empty() }
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph(vec![Span::text(text)], Options::empty())
    }

    #[test]
    fn nests_flat_headers_by_level() {
        let flat = vec![header(1, "Intro"), paragraph("a"), header(2, "Sub"), paragraph("b"), header(1, "Next")];
        let nested = nest_sections(flat);
        assert_eq!(nested.len(), 2);
        match &nested[0] {
            Block::Section { content, .. } => {
                assert_eq!(content.len(), 2);
                assert!(matches!(content[1], Block::Section { .. }));
            }
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn nest_sections_is_a_no_op_on_an_already_nested_tree() {
        let nested = vec![Block::Section { header: Box::new(header(1, "Intro")), content: vec![paragraph("a")], options: Options::empty() }];
        let twice = nest_sections(nested.clone());
        assert_eq!(nested, twice);
    }

    #[test]
    fn numbers_nested_sections_hierarchically_when_enabled() {
        let tree = nest_sections(vec![header(1, "A"), header(2, "A.1"), header(1, "B")]);
        let numbered = number_sections(tree, true);
        match &numbered[0] {
            Block::Section { options, content, .. } => {
                assert_eq!(options.id, Some("section-1".to_string()));
                match &content[0] {
                    Block::Section { options, .. } => assert_eq!(options.id, Some("section-1-1".to_string())),
                    other => panic!("expected nested section, got {other:?}"),
                }
            }
            other => panic!("expected section, got {other:?}"),
        }
        match &numbered[1] {
            Block::Section { options, .. } => assert_eq!(options.id, Some("section-2".to_string())),
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn number_sections_is_a_no_op_when_disabled() {
        let tree = nest_sections(vec![header(1, "A")]);
        let numbered = number_sections(tree.clone(), false);
        assert_eq!(tree, numbered);
    }

    #[test]
    fn generates_a_toc_from_numbered_sections() {
        let tree = number_sections(nest_sections(vec![header(1, "A"), header(2, "A.1")]), true);
        let toc = generate_toc(&tree);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].target_id, Some("section-1".to_string()));
        assert_eq!(toc[0].children[0].target_id, Some("section-1-1".to_string()));
    }

    #[test]
    fn unresolved_internal_link_target_becomes_invalid() {
        let tree = vec![Block::Paragraph(
            vec![Span::SpanLink { content: vec![], target: LinkTarget::Internal(laika_ast::path("/missing")), title: None, options: Options::empty() }],
            Options::empty(),
        )];
        let known = BTreeSet::new();
        let resolved = resolve_internal_targets(tree, &known);
        match &resolved[0] {
            Block::Paragraph(spans, _) => assert!(spans[0].is_invalid()),
            _ => panic!(),
        }
    }

    fn code_block(lang: Option<&str>, code: &str) -> Block {
        Block::CodeBlock {
            lang: lang.map(str::to_string),
            spans: vec![Span::text(code)],
            options: Options::empty(),
        }
    }

    #[test]
    fn apply_highlighter_replaces_a_code_blocks_spans() {
        let tree = vec![code_block(Some("rust"), "fn x")];
        let highlighted = apply_highlighter(tree, &|lang, code| {
            vec![Span::Literal(format!("[{lang}] {code}"), Options::with_styles(["tok"]))]
        });
        match &highlighted[0] {
            Block::CodeBlock { spans, .. } => {
                assert_eq!(spans, &[Span::Literal("[rust] fn x".to_string(), Options::with_styles(["tok"]))]);
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn apply_highlighter_leaves_code_blocks_with_no_lang_untouched() {
        let tree = vec![code_block(None, "plain text")];
        let highlighted = apply_highlighter(tree.clone(), &|_, _| {
            panic!("highlighter should never run without a lang")
        });
        assert_eq!(highlighted, tree);
    }
}
