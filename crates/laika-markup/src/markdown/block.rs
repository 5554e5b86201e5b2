//! Markdown/GFM block grammar (§4.3): recursive-descent over [`Line`]s,
//! each leaf producing a `Span::UnresolvedSpanSequence` placeholder for the
//! later span pass.

use laika_ast::{Alignment, Block, CellKind, EnumFormat, ListItem, Options, Row, Span};

use crate::directive::{try_directive_call, DirectiveRegistry};
use crate::line::{fragment_for_lines, offset_within, Line};

/// Parses `lines` with an empty directive registry — the shape most tests
/// and format-internal recursive calls want. Callers that register
/// extension directives use [`parse_blocks_with`] instead.
pub fn parse_blocks(root: &str, lines: &[Line]) -> Vec<Block> {
    let empty = DirectiveRegistry::new();
    parse_blocks_with(root, lines, &empty)
}

pub fn parse_blocks_with(root: &str, lines: &[Line], registry: &DirectiveRegistry) -> Vec<Block> {
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
        if let Some((block, consumed)) = try_atx_header(root, &lines[i..]) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_thematic_break(&lines[i..]) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_fenced_code(&lines[i..]) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_link_definition(&lines[i..]) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_blockquote(root, &lines[i..], registry) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_list(root, &lines[i..], registry) {
            blocks.push(block);
            i += consumed;
            continue;
        }
        if let Some((block, consumed)) = try_table(root, &lines[i..]) {
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

fn try_atx_header(root: &str, lines: &[Line]) -> Option<(Block, usize)> {
    let line = lines[0];
    let trimmed = line.text.trim_start();
    if line.text.len() - trimmed.len() >= 4 {
        return None;
    }
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let after = &trimmed[hashes..];
    if !after.is_empty() && !after.starts_with(char::is_whitespace) {
        return None;
    }
    let content = after.trim_start();
    let trimmed_end = content.trim_end();
    let trailing_hashes = trimmed_end.chars().rev().take_while(|&c| c == '#').count();
    let content = if trailing_hashes > 0 && trailing_hashes < trimmed_end.len() {
        let before = &trimmed_end[..trimmed_end.len() - trailing_hashes];
        if before.is_empty() || before.ends_with(char::is_whitespace) {
            before.trim_end()
        } else {
            trimmed_end
        }
    } else {
        trimmed_end
    };
    let spans = if content.is_empty() {
        vec![]
    } else {
        let start = line.start + offset_within(line.text, content);
        vec![Span::UnresolvedSpanSequence(fragment_for_lines(
            root,
            &[Line { text: content, start }],
        ))]
    };
    Some((
        Block::Header {
            level: hashes as u8,
            content: spans,
            options: Options::empty(),
        },
        1,
    ))
}

fn try_thematic_break(lines: &[Line]) -> Option<(Block, usize)> {
    let t = lines[0].text.trim();
    if t.len() < 3 {
        return None;
    }
    let first = t.chars().next()?;
    if !matches!(first, '-' | '*' | '_') {
        return None;
    }
    let stripped: String = t.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.len() < 3 || !stripped.chars().all(|c| c == first) {
        return None;
    }
    Some((Block::Rule(Options::empty()), 1))
}

fn try_fenced_code(lines: &[Line]) -> Option<(Block, usize)> {
    let first = lines[0];
    let trimmed = first.text.trim_start();
    if first.text.len() - trimmed.len() >= 4 {
        return None;
    }
    let fence_char = trimmed.chars().next()?;
    if fence_char != '`' && fence_char != '~' {
        return None;
    }
    let fence_len = trimmed.chars().take_while(|&c| c == fence_char).count();
    if fence_len < 3 {
        return None;
    }
    let info = trimmed[fence_len..].trim();
    if fence_char == '`' && info.contains('`') {
        return None;
    }
    let lang = info
        .split_whitespace()
        .next()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    let mut body_lines: Vec<Line> = Vec::new();
    let mut i = 1;
    let mut end_idx = lines.len();
    while i < lines.len() {
        let l = lines[i].text.trim_start();
        let close_len = l.chars().take_while(|&c| c == fence_char).count();
        if close_len >= fence_len && l[close_len..].trim().is_empty() {
            end_idx = i + 1;
            break;
        }
        body_lines.push(lines[i]);
        i += 1;
    }
    let code_text = body_lines
        .iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n");
    Some((
        Block::CodeBlock {
            lang,
            spans: vec![Span::Text(code_text)],
            options: Options::empty(),
        },
        end_idx,
    ))
}

fn try_link_definition(lines: &[Line]) -> Option<(Block, usize)> {
    let l = lines[0];
    let t = l.text.trim_start();
    if !t.starts_with('[') {
        return None;
    }
    let close = t.find("]:")?;
    let id = t[1..close].trim();
    if id.is_empty() {
        return None;
    }
    let rest = t[close + 2..].trim();
    if rest.is_empty() {
        return None;
    }
    let mut parts = rest.splitn(2, char::is_whitespace);
    let target = parts.next()?.to_string();
    let title = parts
        .next()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_matches(|c| c == '"' || c == '\'').to_string());
    let target = if target.contains("://") || target.starts_with("//") {
        laika_ast::LinkTarget::External(target)
    } else {
        laika_ast::LinkTarget::Internal(laika_ast::path(target))
    };
    Some((
        Block::LinkDefinition {
            id: id.to_string(),
            target,
            title,
        },
        1,
    ))
}

fn try_blockquote(root: &str, lines: &[Line], registry: &DirectiveRegistry) -> Option<(Block, usize)> {
    if !lines[0].text.trim_start().starts_with('>') {
        return None;
    }
    let mut inner = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let l = lines[i];
        let trimmed = l.text.trim_start();
        if !trimmed.starts_with('>') {
            break;
        }
        let after_marker = &trimmed[1..];
        let after_marker = after_marker.strip_prefix(' ').unwrap_or(after_marker);
        let start = l.start + offset_within(l.text, after_marker);
        inner.push(Line { text: after_marker, start });
        i += 1;
    }
    let content = parse_blocks_with(root, &inner, registry);
    Some((
        Block::QuotedBlock {
            content,
            attribution: vec![],
            options: Options::empty(),
        },
        i,
    ))
}

enum ListKind {
    Bullet(char),
    Enum { start: i64, format: EnumFormat, delim: char },
}

fn same_list_kind(a: &ListKind, b: &ListKind) -> bool {
    match (a, b) {
        (ListKind::Bullet(x), ListKind::Bullet(y)) => x == y,
        (ListKind::Enum { delim: dx, .. }, ListKind::Enum { delim: dy, .. }) => dx == dy,
        _ => false,
    }
}

/// Detects a list marker at the start of `line`, returning its kind and the
/// absolute column (within `line.text`) where the item's content begins.
fn marker_at(line: &Line) -> Option<(ListKind, usize)> {
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
            return Some((ListKind::Bullet(c0), indent + 1));
        }
        if after.starts_with(' ') {
            let spaces = after.chars().take_while(|c| *c == ' ').count();
            return Some((ListKind::Bullet(c0), indent + 1 + spaces.min(4).max(1)));
        }
        return None;
    }
    let digits_len = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits_len == 0 || digits_len > 9 {
        return None;
    }
    let rest = &trimmed[digits_len..];
    let delim = rest.chars().next().filter(|c| *c == '.' || *c == ')')?;
    let after = &rest[1..];
    let start: i64 = trimmed[..digits_len].parse().ok()?;
    if after.is_empty() {
        return Some((
            ListKind::Enum { start, format: EnumFormat::Arabic, delim },
            indent + digits_len + 1,
        ));
    }
    if after.starts_with(' ') {
        let spaces = after.chars().take_while(|c| *c == ' ').count();
        return Some((
            ListKind::Enum { start, format: EnumFormat::Arabic, delim },
            indent + digits_len + 1 + spaces.min(4).max(1),
        ));
    }
    None
}

fn try_list(root: &str, lines: &[Line], registry: &DirectiveRegistry) -> Option<(Block, usize)> {
    let (first_kind, _) = marker_at(&lines[0])?;
    let is_bullet = matches!(first_kind, ListKind::Bullet(_));
    let mut items: Vec<ListItem> = Vec::new();
    let mut i = 0;
    let mut enum_start = 1i64;
    let enum_format = EnumFormat::Arabic;

    while i < lines.len() {
        let line = lines[i];
        if line.is_blank() {
            break;
        }
        let Some((kind, content_col)) = marker_at(&line) else { break };
        if !same_list_kind(&kind, &first_kind) {
            break;
        }
        if items.is_empty() {
            if let ListKind::Enum { start, .. } = kind {
                enum_start = start;
            }
        }
        let marker_content = if content_col <= line.text.len() {
            &line.text[content_col..]
        } else {
            ""
        };
        let mut item_lines = vec![Line {
            text: marker_content,
            start: line.start + content_col.min(line.text.len()),
        }];
        i += 1;
        while i < lines.len() {
            let l = lines[i];
            if l.is_blank() {
                if i + 1 < lines.len() && lines[i + 1].indent() >= content_col && marker_at(&lines[i + 1]).is_none() {
                    item_lines.push(Line { text: "", start: l.start });
                    i += 1;
                    continue;
                } else {
                    break;
                }
            }
            if l.indent() >= content_col {
                let stripped = l
                    .strip_prefix_bytes(content_col.min(l.text.len()))
                    .unwrap_or(Line { text: "", start: l.end() });
                item_lines.push(stripped);
                i += 1;
            } else {
                break;
            }
        }
        let content = parse_blocks_with(root, &item_lines, registry);
        items.push(ListItem { content, options: Options::empty() });
    }

    if items.is_empty() {
        return None;
    }
    let block = if is_bullet {
        Block::BulletList { items, options: Options::empty() }
    } else {
        Block::EnumList { items, start: enum_start, format: enum_format, options: Options::empty() }
    };
    Some((block, i))
}

fn split_table_row(line: &str) -> Vec<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim()).collect()
}

fn is_alignment_row(s: &str) -> bool {
    let cells = split_table_row(s);
    !cells.is_empty()
        && cells.iter().all(|c| {
            !c.is_empty()
                && c.contains('-')
                && c.chars().all(|ch| ch == '-' || ch == ':')
        })
}

fn parse_alignment(c: &str) -> Alignment {
    let left = c.starts_with(':');
    let right = c.ends_with(':');
    match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    }
}

fn table_cell(root: &str, source_line: &Line, cell_text: &str, kind: CellKind, align: Alignment) -> laika_ast::Cell {
    let content = if cell_text.is_empty() {
        vec![]
    } else {
        let start = source_line.start + offset_within(source_line.text, cell_text);
        vec![Block::Paragraph(
            vec![Span::UnresolvedSpanSequence(fragment_for_lines(
                root,
                &[Line { text: cell_text, start }],
            ))],
            Options::empty(),
        )]
    };
    laika_ast::Cell { kind, align, content }
}

fn try_table(root: &str, lines: &[Line]) -> Option<(Block, usize)> {
    let header = lines[0];
    if !header.text.contains('|') || header.is_blank() {
        return None;
    }
    if lines.len() < 2 {
        return None;
    }
    if !is_alignment_row(lines[1].text) {
        return None;
    }
    let header_cells = split_table_row(header.text);
    let aligns: Vec<Alignment> = split_table_row(lines[1].text).iter().map(|c| parse_alignment(c)).collect();
    if header_cells.len() != aligns.len() {
        return None;
    }

    let head_row = Row {
        cells: header_cells
            .iter()
            .zip(&aligns)
            .map(|(c, a)| table_cell(root, &header, c, CellKind::HeadCell, *a))
            .collect(),
    };

    let mut body = Vec::new();
    let mut i = 2;
    while i < lines.len() {
        let l = lines[i];
        if l.is_blank() || !l.text.contains('|') {
            break;
        }
        let cells = split_table_row(l.text);
        let row = Row {
            cells: cells
                .iter()
                .enumerate()
                .map(|(idx, c)| table_cell(root, &l, c, CellKind::BodyCell, *aligns.get(idx).unwrap_or(&Alignment::None)))
                .collect(),
        };
        body.push(row);
        i += 1;
    }

    Some((
        Block::Table { head: vec![head_row], body, options: Options::empty() },
        i,
    ))
}

fn starts_new_block(line: &Line) -> bool {
    let t = line.text.trim_start();
    if line.indent() >= 4 {
        return false;
    }
    if t.starts_with('#') {
        return true;
    }
    if t.starts_with('>') {
        return true;
    }
    if marker_at(line).is_some() {
        return true;
    }
    let fc = t.chars().next();
    if matches!(fc, Some('`') | Some('~')) {
        let n = t.chars().take_while(|&c| Some(c) == fc).count();
        if n >= 3 {
            return true;
        }
    }
    if t.starts_with('[') && t.contains("]:") {
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
    if last_trimmed.ends_with("::") && last_trimmed.len() > 2 {
        let last = *collected.last().unwrap();
        let without_marker = &last_trimmed[..last_trimmed.len() - 2];
        let mut para_lines = collected.clone();
        *para_lines.last_mut().unwrap() = Line { text: without_marker, start: last.start };
        let fragment = fragment_for_lines(root, &para_lines);
        let paragraph = Block::Paragraph(vec![Span::UnresolvedSpanSequence(fragment)], Options::empty());

        let mut j = i;
        while j < lines.len() && lines[j].is_blank() {
            j += 1;
        }
        if j < lines.len() && lines[j].indent() >= 2 && j > i {
            let mut body = Vec::new();
            let mut k = j;
            while k < lines.len() && (lines[k].is_blank() || lines[k].indent() >= 2) {
                let l = lines[k];
                if l.is_blank() {
                    body.push(Line { text: "", start: l.start });
                } else if let Some(stripped) = l.strip_prefix_bytes(2) {
                    body.push(stripped);
                } else {
                    break;
                }
                k += 1;
            }
            let text = body.iter().map(|l| l.text).collect::<Vec<_>>().join("\n");
            let literal = Block::LiteralBlock(text, Options::empty());
            return (Block::BlockSequence(vec![paragraph, literal], Options::empty()), k);
        }
        return (paragraph, i);
    }

    let fragment = fragment_for_lines(root, &collected);
    (Block::Paragraph(vec![Span::UnresolvedSpanSequence(fragment)], Options::empty()), i)
}
