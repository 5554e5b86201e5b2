//! The Resolve phase (§4.5): link-id, footnote-label, citation-key and
//! substitution-reference lookups, interpreted-text role application.
//! Every rule here turns an unresolved placeholder `Span` into either its
//! resolved counterpart or an `Invalid` node — never a panic, never a
//! silently dropped reference.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use laika_ast::{rewrite_blocks, rewrite_spans_in_blocks, Action, Block, FootnoteLabel, Invalid, LinkTarget, Span};
use laika_markup::RoleRegistry;

/// The ten-symbol autosymbol sequence named in §4.5, repeated with
/// doubling once exhausted (`*`, `†`, ..., `♣`, then `**`, `††`, ...).
const AUTOSYMBOLS: [&str; 10] = ["*", "\u{2020}", "\u{2021}", "\u{00a7}", "\u{00b6}", "#", "\u{2660}", "\u{2665}", "\u{2666}", "\u{2663}"];

fn nth_autosymbol(index: usize) -> String {
    let cycle = index / AUTOSYMBOLS.len();
    let base = AUTOSYMBOLS[index % AUTOSYMBOLS.len()];
    base.repeat(cycle + 1)
}

fn normalize_link_id(id: &str) -> String {
    id.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Resolves `[id]`-style link references against the document's
/// `LinkDefinition` blocks (§4.5: "matched case-insensitively after
/// whitespace normalization"). Unresolved references become
/// `Invalid{"unresolved link id reference: X", source}`.
pub fn resolve_links(blocks: Vec<Block>) -> Vec<Block> {
    let mut definitions: BTreeMap<String, (LinkTarget, Option<String>)> = BTreeMap::new();
    collect_link_definitions(&blocks, &mut definitions);

    let expand = |span: &Span| -> Action<Span> {
        match span {
            Span::LinkIdReference { id, content, source } => {
                let key = normalize_link_id(id);
                match definitions.get(&key) {
                    Some((target, title)) => Action::Replace(Span::SpanLink {
                        content: content.clone(),
                        target: target.clone(),
                        title: title.clone(),
                        options: laika_ast::Options::empty(),
                    }),
                    None => Action::Replace(Span::Invalid(Invalid::error(
                        format!("unresolved link id reference: {id}"),
                        source.clone(),
                    ))),
                }
            }
            _ => Action::Retain,
        }
    };
    rewrite_spans_in_blocks(blocks, &expand)
}

fn collect_link_definitions(blocks: &[Block], out: &mut BTreeMap<String, (LinkTarget, Option<String>)>) {
    for block in blocks {
        if let Block::LinkDefinition { id, target, title } = block {
            out.insert(normalize_link_id(id), (target.clone(), title.clone()));
        }
        if let Some(children) = block.children() {
            collect_link_definitions(children, out);
        }
    }
}

/// Resolves `|name|`-style substitution references against the document's
/// `SubstitutionDefinition` blocks (§4.5: "matched case-sensitively;
/// cycles are detected by threading a visited-set through the resolver").
pub fn resolve_substitutions(blocks: Vec<Block>) -> Vec<Block> {
    let mut definitions: BTreeMap<String, Vec<Span>> = BTreeMap::new();
    collect_substitution_definitions(&blocks, &mut definitions);

    let expand = |span: &Span| -> Action<Span> {
        match span {
            Span::SubstitutionReference { name, source } => {
                let mut visited = Vec::new();
                match expand_substitution(name, source, &definitions, &mut visited) {
                    Ok(spans) => Action::ReplaceMany(spans),
                    Err(invalid) => Action::Replace(Span::Invalid(invalid)),
                }
            }
            _ => Action::Retain,
        }
    };
    rewrite_spans_in_blocks(blocks, &expand)
}

fn expand_substitution(
    name: &str,
    source: &laika_ast::SourceFragment,
    definitions: &BTreeMap<String, Vec<Span>>,
    visited: &mut Vec<String>,
) -> Result<Vec<Span>, Invalid> {
    if visited.iter().any(|n| n == name) {
        return Err(Invalid::error(format!("circular substitution reference: {name}"), source.clone()));
    }
    let Some(content) = definitions.get(name) else {
        return Err(Invalid::error(format!("unresolved substitution reference: {name}"), source.clone()));
    };
    visited.push(name.to_string());
    let mut out = Vec::with_capacity(content.len());
    for span in content {
        match span {
            Span::SubstitutionReference { name: nested, source: nested_source } => {
                out.extend(expand_substitution(nested, nested_source, definitions, visited)?);
            }
            other => out.push(other.clone()),
        }
    }
    visited.pop();
    Ok(out)
}

fn collect_substitution_definitions(blocks: &[Block], out: &mut BTreeMap<String, Vec<Span>>) {
    for block in blocks {
        if let Block::SubstitutionDefinition { name, content } = block {
            out.insert(name.clone(), content.clone());
        }
        if let Some(children) = block.children() {
            collect_substitution_definitions(children, out);
        }
    }
}

struct FootnoteTables {
    numeric: BTreeMap<u32, (String, String)>,
    named: BTreeMap<String, (String, String)>,
    anonymous_numbers: VecDeque<(String, String)>,
    anonymous_symbols: VecDeque<(String, String)>,
    citations: BTreeMap<String, (String, String)>,
    used_numeric: Vec<u32>,
    next_auto: u32,
    next_symbol_index: usize,
}

impl FootnoteTables {
    fn new(used_numeric: Vec<u32>) -> Self {
        FootnoteTables {
            numeric: BTreeMap::new(),
            named: BTreeMap::new(),
            anonymous_numbers: VecDeque::new(),
            anonymous_symbols: VecDeque::new(),
            citations: BTreeMap::new(),
            used_numeric,
            next_auto: 1,
            next_symbol_index: 0,
        }
    }

    fn next_autonumber(&mut self) -> (String, String) {
        while self.used_numeric.contains(&self.next_auto) {
            self.next_auto += 1;
        }
        let assigned = (format!("footnote-{}", self.next_auto), self.next_auto.to_string());
        self.next_auto += 1;
        assigned
    }

    fn next_autosymbol(&mut self) -> (String, String) {
        let symbol = nth_autosymbol(self.next_symbol_index);
        self.next_symbol_index += 1;
        (format!("footnote-symbol-{}", self.next_symbol_index), symbol)
    }
}

/// Resolves footnote and citation references against the document's
/// `Footnote`/`Citation` definition blocks, assigning each definition a
/// concrete display label and target id along the way (§4.5's footnote
/// ordering rules).
pub fn resolve_footnotes_and_citations(blocks: Vec<Block>) -> Vec<Block> {
    let mut used_numeric = Vec::new();
    collect_used_numeric_labels(&blocks, &mut used_numeric);

    let tables = RefCell::new(FootnoteTables::new(used_numeric));

    let assign = |block: &Block| -> Action<Block> {
        match block {
            Block::Footnote { label, content: _, options } => {
                let mut t = tables.borrow_mut();
                let (target_id, display) = match label {
                    FootnoteLabel::Numeric(n) => (format!("footnote-{n}"), n.to_string()),
                    FootnoteLabel::AutoNumberNamed(name) => {
                        if let Some(existing) = t.named.get(name) {
                            existing.clone()
                        } else {
                            let assigned = t.next_autonumber();
                            t.named.insert(name.clone(), assigned.clone());
                            assigned
                        }
                    }
                    FootnoteLabel::AutoNumber => {
                        let assigned = t.next_autonumber();
                        t.anonymous_numbers.push_back(assigned.clone());
                        assigned
                    }
                    FootnoteLabel::AutoSymbol => {
                        let assigned = t.next_autosymbol();
                        t.anonymous_symbols.push_back(assigned.clone());
                        assigned
                    }
                };
                if let FootnoteLabel::Numeric(n) = label {
                    t.numeric.insert(*n, (target_id.clone(), display));
                }
                let mut new_options = options.clone();
                new_options.id = Some(target_id);
                Action::Replace(Block::Footnote { label: label.clone(), content: content_of(block), options: new_options })
            }
            Block::Citation { key, content: _, options } => {
                let target_id = format!("citation-{key}");
                tables.borrow_mut().citations.insert(key.clone(), (target_id.clone(), key.clone()));
                let mut new_options = options.clone();
                new_options.id = Some(target_id);
                Action::Replace(Block::Citation { key: key.clone(), content: content_of(block), options: new_options })
            }
            _ => Action::Retain,
        }
    };
    let blocks = rewrite_blocks(blocks, &assign);

    let resolve_refs = |span: &Span| -> Action<Span> {
        match span {
            Span::FootnoteReference { label, source } => {
                let mut t = tables.borrow_mut();
                let found = match label {
                    FootnoteLabel::Numeric(n) => t.numeric.get(n).cloned(),
                    FootnoteLabel::AutoNumberNamed(name) => t.named.get(name).cloned(),
                    FootnoteLabel::AutoNumber => t.anonymous_numbers.pop_front(),
                    FootnoteLabel::AutoSymbol => t.anonymous_symbols.pop_front(),
                };
                match found {
                    Some((target_id, display)) => Action::Replace(Span::FootnoteLink {
                        target_id,
                        label: display,
                        options: laika_ast::Options::empty(),
                    }),
                    None => Action::Replace(Span::Invalid(Invalid::error(
                        "unresolved footnote reference".to_string(),
                        source.clone(),
                    ))),
                }
            }
            Span::CitationReference { key, source } => {
                let t = tables.borrow();
                match t.citations.get(key) {
                    Some((target_id, display)) => Action::Replace(Span::CitationLink {
                        target_id: target_id.clone(),
                        label: display.clone(),
                        options: laika_ast::Options::empty(),
                    }),
                    None => Action::Replace(Span::Invalid(Invalid::error(
                        format!("unresolved citation reference: {key}"),
                        source.clone(),
                    ))),
                }
            }
            _ => Action::Retain,
        }
    };
    rewrite_spans_in_blocks(blocks, &resolve_refs)
}

fn content_of(block: &Block) -> Vec<Block> {
    block.children().map(<[Block]>::to_vec).unwrap_or_default()
}

fn collect_used_numeric_labels(blocks: &[Block], out: &mut Vec<u32>) {
    for block in blocks {
        if let Block::Footnote { label: FootnoteLabel::Numeric(n), .. } = block {
            out.push(*n);
        }
        if let Some(children) = block.children() {
            collect_used_numeric_labels(children, out);
        }
    }
}

/// Resolves `InterpretedText` spans against a text-role registry (§4.4),
/// falling back to the registry's default role for unqualified text.
pub fn resolve_interpreted_text(blocks: Vec<Block>, roles: &RoleRegistry) -> Vec<Block> {
    let expand = |span: &Span| -> Action<Span> {
        match span {
            Span::InterpretedText { text, role, source } => {
                Action::Replace(roles.apply(text, role.as_deref(), source.clone()))
            }
            _ => Action::Retain,
        }
    };
    rewrite_spans_in_blocks(blocks, &expand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_ast::{Options, SourceFragment};

    fn frag(s: &str) -> laika_ast::SourceFragment {
        SourceFragment::synthetic(s)
    }

    #[test]
    fn resolves_a_case_insensitive_whitespace_normalized_link_reference() {
        let tree = vec![
            Block::Paragraph(
                vec![Span::LinkIdReference { id: "  Foo  Bar ".to_string(), content: vec![Span::text("link")], source: frag("[link][Foo Bar]") }],
                Options::empty(),
            ),
            Block::LinkDefinition { id: "foo bar".to_string(), target: LinkTarget::External("http://x".to_string()), title: None },
        ];
        let resolved = resolve_links(tree);
        match &resolved[0] {
            Block::Paragraph(spans, _) => assert!(matches!(&spans[0], Span::SpanLink { .. })),
            _ => panic!(),
        }
    }

    #[test]
    fn unresolved_link_reference_becomes_invalid() {
        let tree = vec![Block::Paragraph(
            vec![Span::LinkIdReference { id: "missing".to_string(), content: vec![], source: frag("[x][missing]") }],
            Options::empty(),
        )];
        let resolved = resolve_links(tree);
        match &resolved[0] {
            Block::Paragraph(spans, _) => assert!(spans[0].is_invalid()),
            _ => panic!(),
        }
    }

    #[test]
    fn resolves_a_substitution_reference_to_its_definition_content() {
        let tree = vec![
            Block::SubstitutionDefinition { name: "id".to_string(), content: vec![Span::text("X")] },
            Block::Paragraph(vec![Span::SubstitutionReference { name: "id".to_string(), source: frag("|id|") }], Options::empty()),
        ];
        let resolved = resolve_substitutions(tree);
        match &resolved[1] {
            Block::Paragraph(spans, _) => assert_eq!(spans, &vec![Span::text("X")]),
            _ => panic!(),
        }
    }

    #[test]
    fn detects_a_circular_substitution() {
        let tree = vec![
            Block::SubstitutionDefinition { name: "a".to_string(), content: vec![Span::SubstitutionReference { name: "b".to_string(), source: frag("|b|") }] },
            Block::SubstitutionDefinition { name: "b".to_string(), content: vec![Span::SubstitutionReference { name: "a".to_string(), source: frag("|a|") }] },
            Block::Paragraph(vec![Span::SubstitutionReference { name: "a".to_string(), source: frag("|a|") }], Options::empty()),
        ];
        let resolved = resolve_substitutions(tree);
        match &resolved[2] {
            Block::Paragraph(spans, _) => assert!(spans[0].is_invalid()),
            _ => panic!(),
        }
    }

    #[test]
    fn autonumber_footnotes_claim_the_lowest_unused_integer() {
        let tree = vec![
            Block::Footnote { label: FootnoteLabel::Numeric(2), content: vec![], options: Options::empty() },
            Block::Footnote { label: FootnoteLabel::AutoNumber, content: vec![], options: Options::empty() },
            Block::Paragraph(vec![Span::FootnoteReference { label: FootnoteLabel::AutoNumber, source: frag("[#]_") }], Options::empty()),
        ];
        let resolved = resolve_footnotes_and_citations(tree);
        match &resolved[2] {
            Block::Paragraph(spans, _) => match &spans[0] {
                Span::FootnoteLink { label, .. } => assert_eq!(label, "1"),
                other => panic!("expected footnote link, got {other:?}"),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn autosymbol_footnotes_draw_from_the_named_sequence_and_double_on_wrap() {
        let tree = vec![
            Block::Footnote { label: FootnoteLabel::AutoSymbol, content: vec![], options: Options::empty() },
            Block::Paragraph(vec![Span::FootnoteReference { label: FootnoteLabel::AutoSymbol, source: frag("[*]_") }], Options::empty()),
        ];
        let resolved = resolve_footnotes_and_citations(tree);
        match &resolved[1] {
            Block::Paragraph(spans, _) => match &spans[0] {
                Span::FootnoteLink { label, .. } => assert_eq!(label, "*"),
                other => panic!("expected footnote link, got {other:?}"),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn resolves_a_citation_reference_by_key() {
        let tree = vec![
            Block::Citation { key: "smith04".to_string(), content: vec![], options: Options::empty() },
            Block::Paragraph(vec![Span::CitationReference { key: "smith04".to_string(), source: frag("[smith04]_") }], Options::empty()),
        ];
        let resolved = resolve_footnotes_and_citations(tree);
        match &resolved[1] {
            Block::Paragraph(spans, _) => assert!(matches!(&spans[0], Span::CitationLink { .. })),
            _ => panic!(),
        }
    }
}
