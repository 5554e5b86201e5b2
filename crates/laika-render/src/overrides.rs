//! Renderer-override composition (§6.2, §9): user partial functions tried
//! before the backend's default, composed as a plain ordered list — "a
//! config-struct pattern... merging records, no inheritance, no
//! monkey-patching" (§9's design note on extension bundles applies here
//! just as much as to directives and roles).

use laika_ast::{Block, Span};

use crate::Formatter;

type BlockOverride = Box<dyn Fn(&mut Formatter, &Block) -> Option<String>>;
type SpanOverride = Box<dyn Fn(&mut Formatter, &Span) -> Option<String>>;

/// An ordered set of partial renderer functions layered in front of a
/// [`RenderBackend`](crate::RenderBackend)'s defaults. Built once per
/// `transform` call via `using(extension_bundle)` (§6.1); empty by default.
#[derive(Default)]
pub struct RendererOverrides {
    block_overrides: Vec<BlockOverride>,
    span_overrides: Vec<SpanOverride>,
}

impl RendererOverrides {
    pub fn new() -> Self {
        RendererOverrides::default()
    }

    /// Registers a partial block renderer, tried after every override
    /// already registered and before the backend default.
    pub fn on_block<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Formatter, &Block) -> Option<String> + 'static,
    {
        self.block_overrides.push(Box::new(f));
        self
    }

    /// Registers a partial span renderer, tried after every override
    /// already registered and before the backend default.
    pub fn on_span<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Formatter, &Span) -> Option<String> + 'static,
    {
        self.span_overrides.push(Box::new(f));
        self
    }

    /// Merges `other`'s overrides after this set's own (§9: "merging
    /// records" — used by `using(extension_bundle)` to combine a bundle's
    /// renderer overrides with ones already registered).
    pub fn merge(mut self, other: RendererOverrides) -> Self {
        self.block_overrides.extend(other.block_overrides);
        self.span_overrides.extend(other.span_overrides);
        self
    }

    pub(crate) fn render_block(&self, fmt: &mut Formatter, block: &Block) -> Option<String> {
        for f in &self.block_overrides {
            if let Some(rendered) = f(fmt, block) {
                return Some(rendered);
            }
        }
        None
    }

    pub(crate) fn render_span(&self, fmt: &mut Formatter, span: &Span) -> Option<String> {
        for f in &self.span_overrides {
            if let Some(rendered) = f(fmt, span) {
                return Some(rendered);
            }
        }
        None
    }
}
