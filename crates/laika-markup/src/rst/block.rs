//! reStructuredText block grammar (§4.3): section levels are assigned
//! top-to-bottom by first appearance of an adornment character, via
//! [`SectionLevels`], then a separate pass ([`nest_sections`]) turns the
//! resulting flat list of `Block::Header`s into a tree of `Block::Section`s.
//! Keeping ordinal assignment and nesting as two decoupled passes avoids
//! threading mutable level state through every recursive call site (list
//! items, directive bodies).

use std::iter::Peekable;
use std::vec::IntoIter;

use laika_ast::{Block, EnumFormat, Invalid, ListItem, Options, Span};

use crate::directive::{apply_block_directive, split_named_fields, try_directive_call, DirectiveRegistry};
use crate::line::{fragment_for_lines, offset_within, Line};

const ADORNMENT_CHARS: &str = "=-`:'\"~^_*+#";

pub fn parse_blocks(root: &str, lines: &[Line]) -> Vec<Block> {
    let empty = DirectiveRegistry::new();
    parse_blocks_with(root, lines, &empty)
}

pub fn parse_blocks_with(root: &str, lines: &[Line], registry: &DirectiveRegistry) -> Vec<Block> {
    let mut levels = SectionLevels::new();
    let flat = parse_flat_blocks(root, lines, registry, &mut levels);
    nest_sections(flat)
}

struct SectionLevels(Vec<char>);

impl SectionLevels {
    fn new() -> Self {
        SectionLevels(Vec::new())
    }

    fn level_for(&mut self, c: char) -> u8 {
        match self.0.iter().position(|&x| x == c) {
            Some(pos) => (pos + 1) as u8,
            None => {
                self.0.push(c);
                self.0.len() as u8
            }
        }
    }
}

fn header_level(b: &Block) -> Option<u8> {
    match b {
        Block::Header { level, .. } => Some(*level),
        _ => None,
    }
}

/// Turns a flat run of blocks (with un-nested `Header`s) into a tree: each
/// header absorbs every following block up to the next header at the same
/// or a shallower level.
fn nest_sections(blocks: Vec<Block>) -> Vec<Block> {
    let mut iter = blocks.into_iter().peekable();
    build_level(&mut iter, 0)
}

fn build_level(iter: &mut Peekable<IntoIter<Block>>, min_level: u8) -> Vec<Block> {
    let mut result = Vec::new();
    while let Some(next) = iter.peek() {
        match header_level(next) {
            Some(lvl) if lvl <= min_level => break,
            Some(lvl) => {
                let header = iter.next().unwrap();
                let content = build_level(iter, lvl);
                result.push(Block::Section { header: Box::new(header), content, options: Options::empty() });
            }
            None => result.push(iter.next().unwrap()),
        }
    }
    result
}

fn is_adornment_line(text: &str) -> Option<char> {
    let t = text.trim_end();
    if t.is_empty() {
        return None;
    }
    let first = t.chars().next()?;
    if !ADORNMENT_CHARS.contains(first) {
        return None;
    }
    if t.chars().all(|c| c == first) {
        Some(first)
    } else {
        None
    }
}

fn parse_flat_blocks(root: &str, lines: &[Line], registry: &DirectiveRegistry, levels: &mut SectionLevels) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].is_blank() {
            i += 1;
            continue;
        }
        if let Some((block, consumed)) =
            try_directive_call(root, &lines[i..], registry, |r, ls| parse_blocks_with(r, ls, registry))
        {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_section_header(root, &lines[i..], levels) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some(consumed) = try_transition(&lines[i..]) {
            blocks.push(Block::Rule(Options::empty()));
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_explicit_markup(root, &lines[i..], registry) {
            i += consumed;
            if let Some(block) = block {
                blocks.push(block);
            }
            continue;
        }
        if let Some((block, consumed)) = try_list(root, &lines[i..], registry) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        let (block, consumed) = parse_paragraph(root, &lines[i..]);
        blocks.push(block);
        i += consumed;
    }
    blocks
}

fn try_section_header(root: &str, lines: &[Line], levels: &mut SectionLevels) -> Option<(Block, usize)> {
    if lines.len() >= 3 {
        if let Some(c0) = is_adornment_line(lines[0].text) {
            if !lines[1].is_blank()
                && is_adornment_line(lines[2].text) == Some(c0)
                && lines[0].text.trim_end().len() >= lines[1].text.trim_end().len()
                && lines[2].text.trim_end().len() >= lines[1].text.trim_end().len()
            {
                let level = levels.level_for(c0);
                let content = vec![Span::UnresolvedSpanSequence(fragment_for_lines(root, &[lines[1]]))];
                return Some((Block::Header { level, content, options: Options::empty() }, 3));
            }
        }
    }
    if lines.len() >= 2 && !lines[0].is_blank() && is_adornment_line(lines[0].text).is_none() {
        if let Some(c0) = is_adornment_line(lines[1].text) {
            if lines[1].text.trim_end().len() >= lines[0].text.trim_end().len() {
                let level = levels.level_for(c0);
                let content = vec![Span::UnresolvedSpanSequence(fragment_for_lines(root, &[lines[0]]))];
                return Some((Block::Header { level, content, options: Options::empty() }, 2));
            }
        }
    }
    None
}

fn try_transition(lines: &[Line]) -> Option<usize> {
    if is_adornment_line(lines[0].text).is_some() && lines[0].text.trim().len() >= 4 {
        Some(1)
    } else {
        None
    }
}

fn make_link_target(s: &str) -> laika_ast::LinkTarget {
    if s.contains("://") {
        laika_ast::LinkTarget::External(s.to_string())
    } else {
        laika_ast::LinkTarget::Internal(laika_ast::path(s.to_string()))
    }
}

/// Gathers the lines after `lines[0]` that continue an explicit-markup body:
/// indented at least `content_col` columns, with the same single
/// blank-line lookahead used for Markdown list continuations.
fn collect_continuation<'a>(lines: &[Line<'a>], content_col: usize) -> (Vec<Line<'a>>, usize) {
    let mut collected = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let l = lines[i];
        if l.is_blank() {
            if i + 1 < lines.len() && lines[i + 1].indent() >= content_col {
                collected.push(Line { text: "", start: l.start });
                i += 1;
                continue;
            }
            break;
        }
        if l.indent() >= content_col {
            let stripped = l.strip_prefix_bytes(content_col.min(l.text.len())).unwrap_or(Line { text: "", start: l.end() });
            collected.push(stripped);
            i += 1;
        } else {
            break;
        }
    }
    while collected.last().is_some_and(|l| l.is_blank()) {
        collected.pop();
    }
    (collected, i)
}

fn try_explicit_markup(root: &str, lines: &[Line], registry: &DirectiveRegistry) -> Option<(Option<Block>, usize)> {
    let first = lines[0];
    let trimmed = first.text.trim_start();
    let indent = first.indent();
    if indent >= 4 || !trimmed.starts_with("..") {
        return None;
    }
    let after = trimmed[2..].strip_prefix(' ').unwrap_or(&trimmed[2..]);

    // Link target: `.. _name: url`
    if let Some(rest) = after.strip_prefix('_') {
        if let Some(colon) = rest.find(':') {
            let name = rest[..colon].trim().trim_matches('`').to_string();
            let url = rest[colon + 1..].trim().to_string();
            return Some((Some(Block::LinkDefinition { id: name, target: make_link_target(&url), title: None }), 1));
        }
    }

    // Substitution definition: `.. |name| replace:: text`
    if let Some(rest) = after.strip_prefix('|') {
        if let Some(close) = rest.find('|') {
            let name = rest[..close].to_string();
            let after_pipe = rest[close + 1..].trim_start();
            if let Some(value) = after_pipe.strip_prefix("replace::") {
                let value = value.trim();
                if value.is_empty() {
                    let source = fragment_for_lines(root, &[first]);
                    return Some((Some(Block::Invalid(Invalid::warning(format!("empty substitution for '|{name}|'"), source))), 1));
                }
                let start = first.start + offset_within(first.text, value);
                let content = vec![Span::UnresolvedSpanSequence(fragment_for_lines(root, &[Line { text: value, start }]))];
                return Some((Some(Block::SubstitutionDefinition { name, content }), 1));
            }
            let source = fragment_for_lines(root, &[first]);
            return Some((Some(Block::Invalid(Invalid::warning(format!("unsupported substitution directive for '|{name}|'"), source))), 1));
        }
    }

    // Footnote / citation: `.. [label] text...`
    if let Some(rest) = after.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            let label = rest[..close].to_string();
            let body_first = rest[close + 1..].trim_start();
            let content_col = if body_first.is_empty() { indent + 3 } else { offset_within(first.text, body_first) };
            let mut item_lines = vec![Line { text: body_first, start: first.start + offset_within(first.text, body_first) }];
            let (mut rest_lines, consumed) = collect_continuation(&lines[1..], content_col);
            item_lines.append(&mut rest_lines);
            let content = parse_blocks_with(root, &item_lines, registry);

            if let Some(n) = label.strip_prefix('#') {
                let fl = if n.is_empty() {
                    laika_ast::FootnoteLabel::AutoNumber
                } else if n == "*" {
                    laika_ast::FootnoteLabel::AutoSymbol
                } else {
                    laika_ast::FootnoteLabel::AutoNumberNamed(n.to_string())
                };
                return Some((Some(Block::Footnote { label: fl, content, options: Options::empty() }), 1 + consumed));
            }
            if let Ok(n) = label.parse::<u32>() {
                return Some((
                    Some(Block::Footnote { label: laika_ast::FootnoteLabel::Numeric(n), content, options: Options::empty() }),
                    1 + consumed,
                ));
            }
            return Some((Some(Block::Citation { key: label, content, options: Options::empty() }), 1 + consumed));
        }
    }

    // Directive: `.. name:: args`
    if let Some(colon_idx) = after.find("::") {
        let name = after[..colon_idx].trim();
        if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            let arg_line = after[colon_idx + 2..].trim().to_string();
            let content_col = indent + 3;
            let (body_lines, consumed) = collect_continuation(&lines[1..], content_col);
            let (raw_named, remaining) = split_named_fields(&body_lines);
            let positional: Vec<String> = if arg_line.is_empty() {
                vec![]
            } else {
                arg_line.split(',').map(|s| s.trim().to_string()).collect()
            };
            let raw_text = Some(remaining.iter().map(|l| l.text).collect::<Vec<_>>().join("\n"));
            let blocks = if remaining.is_empty() { vec![] } else { parse_blocks_with(root, &remaining, registry) };
            let source = fragment_for_lines(root, &lines[..(1 + consumed).max(1)]);
            let block = apply_block_directive(registry, name, positional, raw_named, raw_text, blocks, vec![], source);
            return Some((Some(block), 1 + consumed));
        }
    }

    // Comment: anything else starting with `..`, dropped silently.
    let (_, consumed) = collect_continuation(&lines[1..], indent + 1);
    Some((None, 1 + consumed))
}

enum RstListKind {
    Bullet(char),
    Enum,
}

fn rst_marker_at(line: &Line) -> Option<(RstListKind, usize)> {
    let text = line.text;
    let indent = line.indent();
    if indent >= 4 {
        return None;
    }
    let trimmed = &text[indent..];
    let mut chars = trimmed.chars();
    let c0 = chars.next()?;
    if matches!(c0, '-' | '*' | '+') {
        let after = &trimmed[1..];
        if after.is_empty() {
            return Some((RstListKind::Bullet(c0), indent + 1));
        }
        if after.starts_with(' ') {
            let spaces = after.chars().take_while(|c| *c == ' ').count();
            return Some((RstListKind::Bullet(c0), indent + 1 + spaces.min(4).max(1)));
        }
        return None;
    }
    let digits_len = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits_len == 0 || digits_len > 9 {
        return None;
    }
    let rest = &trimmed[digits_len..];
    let after = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if after.starts_with(' ') || after.is_empty() {
        let spaces = after.chars().take_while(|c| *c == ' ').count();
        return Some((RstListKind::Enum, indent + digits_len + 1 + spaces.min(4).max(1)));
    }
    None
}

fn try_list(root: &str, lines: &[Line], registry: &DirectiveRegistry) -> Option<(Block, usize)> {
    let (first_kind, _) = rst_marker_at(&lines[0])?;
    let is_bullet = matches!(first_kind, RstListKind::Bullet(_));
    let mut items: Vec<ListItem> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.is_blank() {
            break;
        }
        let Some((kind, content_col)) = rst_marker_at(&line) else { break };
        match (&kind, &first_kind) {
            (RstListKind::Bullet(a), RstListKind::Bullet(b)) if a == b => {}
            (RstListKind::Enum, RstListKind::Enum) => {}
            _ => break,
        }
        let marker_content = if content_col <= line.text.len() { &line.text[content_col..] } else { "" };
        let mut item_lines = vec![Line { text: marker_content, start: line.start + content_col.min(line.text.len()) }];
        let (mut rest_lines, consumed) = collect_continuation(&lines[i + 1..], content_col);
        item_lines.append(&mut rest_lines);
        let content = parse_blocks_with(root, &item_lines, registry);
        items.push(ListItem { content, options: Options::empty() });
        i += 1 + consumed;
    }

    if items.is_empty() {
        return None;
    }
    let block = if is_bullet {
        Block::BulletList { items, options: Options::empty() }
    } else {
        Block::EnumList { items, start: 1, format: EnumFormat::Arabic, options: Options::empty() }
    };
    Some((block, i))
}

fn starts_new_block(line: &Line) -> bool {
    if line.indent() >= 4 {
        return false;
    }
    let t = line.text.trim_start();
    if t.starts_with("..") {
        return true;
    }
    if is_adornment_line(line.text).is_some() {
        return true;
    }
    if rst_marker_at(line).is_some() {
        return true;
    }
    if t.starts_with("@:") {
        return true;
    }
    false
}

fn parse_paragraph(root: &str, lines: &[Line]) -> (Block, usize) {
    let mut collected = vec![lines[0]];
    let mut i = 1;
    while i < lines.len() {
        let l = lines[i];
        if l.is_blank() || starts_new_block(&l) {
            break;
        }
        collected.push(l);
        i += 1;
    }

    let last_trimmed = collected.last().unwrap().text.trim_end();
    if last_trimmed.ends_with("::") {
        let last = *collected.last().unwrap();
        let without_marker = last_trimmed[..last_trimmed.len() - 2].trim_end();
        let mut para_lines = collected.clone();
        let keep_paragraph = !without_marker.is_empty();
        if keep_paragraph {
            *para_lines.last_mut().unwrap() = Line { text: without_marker, start: last.start };
        } else {
            para_lines.pop();
        }

        let mut j = i;
        while j < lines.len() && lines[j].is_blank() {
            j += 1;
        }
        if j < lines.len() && lines[j].indent() >= 2 && j > i {
            let (body, consumed_from_j) = collect_continuation(&lines[j..], lines[j].indent());
            let text = body.iter().map(|l| l.text).collect::<Vec<_>>().join("\n");
            let literal = Block::LiteralBlock(text, Options::empty());
            if keep_paragraph {
                let fragment = fragment_for_lines(root, &para_lines);
                let paragraph = Block::Paragraph(vec![Span::UnresolvedSpanSequence(fragment)], Options::empty());
                return (Block::BlockSequence(vec![paragraph, literal], Options::empty()), j + consumed_from_j);
            }
            return (literal, j + consumed_from_j);
        }
        if keep_paragraph {
            let fragment = fragment_for_lines(root, &para_lines);
            return (Block::Paragraph(vec![Span::UnresolvedSpanSequence(fragment)], Options::empty()), i);
        }
    }

    let fragment = fragment_for_lines(root, &collected);
    (Block::Paragraph(vec![Span::UnresolvedSpanSequence(fragment)], Options::empty()), i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::lines_of;

    fn blocks_of(input: &str) -> Vec<Block> {
        let lines = lines_of(input);
        parse_blocks(input, &lines)
    }

    #[test]
    fn parses_a_two_line_section_title() {
        let blocks = blocks_of("Title\n=====\n\nbody text\n");
        match &blocks[0] {
            Block::Section { header, .. } => assert!(matches!(**header, Block::Header { level: 1, .. })),
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn nests_subsections_by_first_appearance_order() {
        let input = "Top\n===\n\nSub\n---\n\ntext\n\nTop2\n====\n";
        let blocks = blocks_of(input);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Section { content, .. } => {
                assert!(matches!(content[0], Block::Section { .. }));
            }
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_transition() {
        let blocks = blocks_of("para\n\n----\n\npara two\n");
        assert!(blocks.iter().any(|b| matches!(b, Block::Rule(_))));
    }

    #[test]
    fn parses_a_link_target() {
        let blocks = blocks_of(".. _laika: https://typelevel.org/Laika/\n");
        match &blocks[0] {
            Block::LinkDefinition { id, .. } => assert_eq!(id, "laika"),
            other => panic!("expected link definition, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_substitution_definition() {
        let blocks = blocks_of(".. |version| replace:: 1.0\n");
        match &blocks[0] {
            Block::SubstitutionDefinition { name, .. } => assert_eq!(name, "version"),
            other => panic!("expected substitution definition, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_numeric_footnote() {
        let blocks = blocks_of(".. [1] A footnote.\n");
        match &blocks[0] {
            Block::Footnote { label: laika_ast::FootnoteLabel::Numeric(1), .. } => {}
            other => panic!("expected footnote, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_citation() {
        let blocks = blocks_of(".. [Knuth1984] The Art of Computer Programming.\n");
        match &blocks[0] {
            Block::Citation { key, .. } => assert_eq!(key, "Knuth1984"),
            other => panic!("expected citation, got {other:?}"),
        }
    }

    #[test]
    fn a_comment_produces_no_block() {
        let blocks = blocks_of(".. this is just a comment\n\npara\n");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Paragraph(..)));
    }

    #[test]
    fn parses_a_generic_directive_through_the_registry() {
        let mut registry = DirectiveRegistry::new();
        registry.register(crate::directive::DirectiveSpec::new("note", crate::directive::BodyMode::Blocks, |inv| {
            Block::QuotedBlock { content: inv.blocks, attribution: vec![], options: Options::empty() }
        }));
        let input = ".. note::\n\n   Body text.\n";
        let lines = lines_of(input);
        let blocks = parse_blocks_with(input, &lines, &registry);
        assert!(matches!(blocks[0], Block::QuotedBlock { .. }));
    }

    #[test]
    fn parses_a_bullet_list() {
        let blocks = blocks_of("- one\n- two\n");
        match &blocks[0] {
            Block::BulletList { items, .. } => assert_eq!(items.len(), 2),
            other => panic!("expected bullet list, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_ending_in_double_colon_opens_a_literal_block() {
        let blocks = blocks_of("intro::\n\n  code here\n");
        match &blocks[0] {
            Block::BlockSequence(parts, _) => {
                assert!(matches!(parts[0], Block::Paragraph(..)));
                assert!(matches!(parts[1], Block::LiteralBlock(..)));
            }
            other => panic!("expected block sequence, got {other:?}"),
        }
    }

    #[test]
    fn lone_double_colon_marker_is_dropped_from_the_output() {
        let blocks = blocks_of("::\n\n  code here\n");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::LiteralBlock(..)));
    }
}
