//! Markdown/GFM front end: block grammar plus inline span grammar, wired
//! together by the crate-level two-pass orchestration in `lib.rs`.

pub mod block;
pub mod span;

use laika_ast::Block;

use crate::directive::DirectiveRegistry;
use crate::line::lines_of;

/// Parses `input` (already whitespace-preprocessed) into a `Block::RootElement`
/// whose leaves still carry `Span::UnresolvedSpanSequence` placeholders.
pub fn parse_root(input: &str) -> Block {
    let empty = DirectiveRegistry::new();
    parse_root_with(input, &empty)
}

/// As [`parse_root`], but resolving `@:name(...)` directive calls against
/// `registry` (populated by the `laika` facade crate from active extension
/// bundles).
pub fn parse_root_with(input: &str, registry: &DirectiveRegistry) -> Block {
    let lines = lines_of(input);
    let blocks = block::parse_blocks_with(input, &lines, registry);
    Block::RootElement(collapse_link_definitions(blocks))
}

/// Markdown's block pass keeps link-reference definitions as in-tree
/// `LinkDefinition` nodes (per §4.3); nothing to collapse yet, but this is
/// the seam `laika-rewrite`'s link-resolution phase will read from. Named
/// separately from `parse_root` so a future definition-hoisting pass (e.g.
/// lifting ones nested inside list items up to document scope) has an
/// obvious home.
fn collapse_link_definitions(blocks: Vec<Block>) -> Vec<Block> {
    blocks
}
