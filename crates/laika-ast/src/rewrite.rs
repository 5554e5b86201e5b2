//! The rewrite primitive (§4.2, §8): two structural recursions —
//! `rewrite_blocks` and `rewrite_spans` — that together implement every
//! tree transformation the rewrite engine (L6) needs.
//!
//! Both descend bottom-up through whichever category they operate on and
//! apply the caller's function to each node exactly once. Rust doesn't give
//! us the reference-equality check the original "if every node retains,
//! return the same tree" guarantee implies — see `DESIGN.md` for that
//! decision — so the contract here is the weaker (but observably
//! equivalent) "retaining every node produces a structurally identical
//! tree".

use crate::block::Block;
use crate::span::Span;

/// What a rewrite function decides to do with the node it was given.
pub enum Action<T> {
    Retain,
    Replace(T),
    Remove,
    ReplaceMany(Vec<T>),
}

impl<T> Action<T> {
    fn apply(self, current: T) -> Vec<T> {
        match self {
            Action::Retain => vec![current],
            Action::Replace(t) => vec![t],
            Action::Remove => vec![],
            Action::ReplaceMany(v) => v,
        }
    }
}

// ---- Span rewriting ----------------------------------------------------

fn rewrite_span_list(spans: Vec<Span>, f: &dyn Fn(&Span) -> Action<Span>) -> Vec<Span> {
    spans
        .into_iter()
        .flat_map(|span| apply_span(span, f))
        .collect()
}

fn apply_span(mut span: Span, f: &dyn Fn(&Span) -> Action<Span>) -> Vec<Span> {
    if let Some(children) = span.children_mut() {
        let taken = std::mem::take(children);
        *children = rewrite_span_list(taken, f);
    }
    let action = f(&span);
    action.apply(span)
}

/// Rewrites every `Span` node anywhere inside `spans`, bottom-up.
pub fn rewrite_spans(spans: Vec<Span>, f: &dyn Fn(&Span) -> Action<Span>) -> Vec<Span> {
    rewrite_span_list(spans, f)
}

fn rewrite_spans_in_block(mut block: Block, f: &dyn Fn(&Span) -> Action<Span>) -> Block {
    descend_block_children(&mut block, &|blocks| {
        blocks
            .into_iter()
            .map(|b| rewrite_spans_in_block(b, f))
            .collect()
    });
    descend_block_own_term_spans(&mut block, f);
    if let Some(spans) = block.own_spans_mut() {
        let taken = std::mem::take(spans);
        *spans = rewrite_span_list(taken, f);
    }
    block
}

/// Rewrites every `Span` node found anywhere inside a block tree, leaving
/// the block structure itself untouched.
pub fn rewrite_spans_in_blocks(blocks: Vec<Block>, f: &dyn Fn(&Span) -> Action<Span>) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|b| rewrite_spans_in_block(b, f))
        .collect()
}

// ---- Block rewriting ----------------------------------------------------

fn rewrite_block_list(blocks: Vec<Block>, f: &dyn Fn(&Block) -> Action<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .flat_map(|block| apply_block(block, f))
        .collect()
}

fn apply_block(mut block: Block, f: &dyn Fn(&Block) -> Action<Block>) -> Vec<Block> {
    descend_block_children(&mut block, &|children| rewrite_block_list(children, f));
    let action = f(&block);
    action.apply(block)
}

/// Rewrites every `Block` node anywhere inside `blocks`, bottom-up.
pub fn rewrite_blocks(blocks: Vec<Block>, f: &dyn Fn(&Block) -> Action<Block>) -> Vec<Block> {
    rewrite_block_list(blocks, f)
}

/// Shared structural descent used by both block- and span-level rewriting:
/// finds every place a `Block` holds nested `Block`s and replaces that list
/// with `transform(list)`.
fn descend_block_children(block: &mut Block, transform: &dyn Fn(Vec<Block>) -> Vec<Block>) {
    match block {
        Block::QuotedBlock { content, .. }
        | Block::Section { content, .. }
        | Block::BlockSequence(content, _)
        | Block::RootElement(content)
        | Block::Footnote { content, .. }
        | Block::Citation { content, .. } => {
            let taken = std::mem::take(content);
            *content = transform(taken);
        }
        Block::BulletList { items, .. } | Block::EnumList { items, .. } => {
            for item in items.iter_mut() {
                let taken = std::mem::take(&mut item.content);
                item.content = transform(taken);
            }
        }
        Block::DefinitionList { items, .. } => {
            for item in items.iter_mut() {
                let taken = std::mem::take(&mut item.definition);
                item.definition = transform(taken);
            }
        }
        Block::Table { head, body, .. } => {
            for row in head.iter_mut().chain(body.iter_mut()) {
                for cell in row.cells.iter_mut() {
                    let taken = std::mem::take(&mut cell.content);
                    cell.content = transform(taken);
                }
            }
        }
        _ => {}
    }
}

/// `DefinitionListItem::term` is the one place a span list hangs directly
/// off a block other than via `own_spans`; handled separately so
/// `descend_block_children` can stay block-shaped.
fn descend_block_own_term_spans(block: &mut Block, f: &dyn Fn(&Span) -> Action<Span>) {
    if let Block::DefinitionList { items, .. } = block {
        for item in items.iter_mut() {
            let taken = std::mem::take(&mut item.term);
            item.term = rewrite_span_list(taken, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn paragraph(text: &str) -> Block {
        Block::Paragraph(vec![Span::text(text)], Options::empty())
    }

    #[test]
    fn retaining_every_node_leaves_tree_structurally_unchanged() {
        let tree = vec![
            Block::Section {
                header: Box::new(Block::Header {
                    level: 1,
                    content: vec![Span::text("Title")],
                    options: Options::empty(),
                }),
                content: vec![paragraph("body")],
                options: Options::empty(),
            },
        ];
        let rewritten = rewrite_blocks(tree.clone(), &|_| Action::Retain);
        assert_eq!(tree, rewritten);
    }

    #[test]
    fn remove_drops_matching_blocks() {
        let tree = vec![paragraph("keep"), paragraph("drop")];
        let rewritten = rewrite_blocks(tree, &|b| match b {
            Block::Paragraph(spans, _) if spans == &[Span::text("drop")] => Action::Remove,
            _ => Action::Retain,
        });
        assert_eq!(rewritten.len(), 1);
    }

    #[test]
    fn rewrite_spans_reaches_into_nested_block_containers() {
        let tree = vec![Block::QuotedBlock {
            content: vec![paragraph("hello")],
            attribution: vec![],
            options: Options::empty(),
        }];
        let rewritten = rewrite_spans_in_blocks(tree, &|s| match s {
            Span::Text(t) if t == "hello" => Action::Replace(Span::text("world")),
            _ => Action::Retain,
        });
        match &rewritten[0] {
            Block::QuotedBlock { content, .. } => match &content[0] {
                Block::Paragraph(spans, _) => assert_eq!(spans[0], Span::text("world")),
                _ => panic!("expected paragraph"),
            },
            _ => panic!("expected quoted block"),
        }
    }

    #[test]
    fn rewrite_is_idempotent_for_a_rule_that_stabilizes() {
        // A rule resolving one placeholder; once resolved it has nothing
        // left to do, which is the shape every real Resolve-phase rule has.
        let tree = vec![Block::Paragraph(
            vec![Span::SubstitutionReference {
                name: "x".into(),
                source: crate::fragment::SourceFragment::synthetic("|x|"),
            }],
            Options::empty(),
        )];
        let rule = |s: &Span| match s {
            Span::SubstitutionReference { name, .. } if name == "x" => {
                Action::Replace(Span::text("resolved"))
            }
            _ => Action::Retain,
        };
        let once = rewrite_spans_in_blocks(tree, &rule);
        let twice = rewrite_spans_in_blocks(once.clone(), &rule);
        assert_eq!(once, twice);
    }

    #[test]
    fn replace_many_splices_multiple_blocks_in_place() {
        let tree = vec![paragraph("a"), paragraph("split"), paragraph("b")];
        let rewritten = rewrite_blocks(tree, &|b| match b {
            Block::Paragraph(spans, _) if spans == &[Span::text("split")] => {
                Action::ReplaceMany(vec![paragraph("s1"), paragraph("s2")])
            }
            _ => Action::Retain,
        });
        assert_eq!(rewritten.len(), 4);
    }
}
