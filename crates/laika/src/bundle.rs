//! Extension bundles (§9): "a config-struct pattern: a record of optional
//! extension points... composed at build time by merging records — no
//! inheritance, no monkey-patching." `using(bundle)` on a [`crate::Transformer`]
//! merges one of these into whatever is already registered.

use std::rc::Rc;

use laika_ast::{Block, Span};
use laika_markup::{DirectiveRegistry, RoleRegistry};
use laika_render::RendererOverrides;

/// A rewrite rule contributed by a bundle: a plain `Vec<Block> -> Vec<Block>`
/// transform, run once per `transform()` call after the built-in Resolve/
/// Build phases and before `Render(format)` (§4.5 names rewrite rules as one
/// of the extension points a bundle can register).
pub type RewriteRule = Rc<dyn Fn(Vec<Block>) -> Vec<Block>>;

/// A syntax highlighter contributed by a bundle (§4.3/§9): given a code
/// block's language tag and raw source text, returns the spans a renderer
/// should show in its place. Run once per `CodeBlock` that names a `lang`,
/// after the Build phase and before any bundle's `rewrite_rules`.
pub type Highlighter = Rc<dyn Fn(&str, &str) -> Vec<Span>>;

/// Block/span/template directives, text roles, rewrite rules, a syntax
/// highlighter, and renderer overrides, bundled together so an application
/// can register a whole extension (e.g. "GFM tables" or "a house style") in
/// one `using()` call.
#[derive(Default)]
pub struct ExtensionBundle {
    pub directives: DirectiveRegistry,
    pub roles: RoleRegistry,
    pub rewrite_rules: Vec<RewriteRule>,
    pub highlighter: Option<Highlighter>,
    pub renderer_overrides: RendererOverrides,
}

impl ExtensionBundle {
    pub fn new() -> Self {
        ExtensionBundle::default()
    }

    pub fn with_directives(mut self, directives: DirectiveRegistry) -> Self {
        self.directives.merge(directives);
        self
    }

    pub fn with_roles(mut self, roles: RoleRegistry) -> Self {
        self.roles.merge(roles);
        self
    }

    pub fn with_rewrite_rule(mut self, rule: impl Fn(Vec<Block>) -> Vec<Block> + 'static) -> Self {
        self.rewrite_rules.push(Rc::new(rule));
        self
    }

    /// Registers a syntax highlighter; a bundle only ever carries one, so a
    /// later call (or a later bundle merged in) replaces an earlier one
    /// rather than stacking, matching how directives/roles resolve a name
    /// collision.
    pub fn with_highlighter(mut self, highlighter: impl Fn(&str, &str) -> Vec<Span> + 'static) -> Self {
        self.highlighter = Some(Rc::new(highlighter));
        self
    }

    pub fn with_renderer_overrides(mut self, overrides: RendererOverrides) -> Self {
        self.renderer_overrides = std::mem::take(&mut self.renderer_overrides).merge(overrides);
        self
    }

    /// Folds `other` into `self` — later bundles' directives/roles win on a
    /// name collision (`DirectiveRegistry`/`RoleRegistry::merge`'s own
    /// "later wins" rule), rewrite rules and renderer overrides are
    /// appended in registration order.
    pub(crate) fn merge(mut self, other: ExtensionBundle) -> Self {
        self.directives.merge(other.directives);
        self.roles.merge(other.roles);
        self.rewrite_rules.extend(other.rewrite_rules);
        if other.highlighter.is_some() {
            self.highlighter = other.highlighter;
        }
        self.renderer_overrides = std::mem::take(&mut self.renderer_overrides).merge(other.renderer_overrides);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_markup::directive::{BodyMode, DirectiveSpec};

    #[test]
    fn merging_two_bundles_keeps_directives_from_both() {
        let a = ExtensionBundle::new().with_directives({
            let mut r = DirectiveRegistry::new();
            r.register(DirectiveSpec::new("note", BodyMode::Spans, |inv| {
                Block::Paragraph(inv.spans, laika_ast::Options::empty())
            }));
            r
        });
        let b = ExtensionBundle::new().with_directives({
            let mut r = DirectiveRegistry::new();
            r.register(DirectiveSpec::new("warn", BodyMode::Spans, |inv| {
                Block::Paragraph(inv.spans, laika_ast::Options::empty())
            }));
            r
        });
        let merged = a.merge(b);
        assert!(merged.directives.get("note").is_some());
        assert!(merged.directives.get("warn").is_some());
    }

    #[test]
    fn merging_two_bundles_lets_the_later_highlighter_win() {
        let a = ExtensionBundle::new().with_highlighter(|_, code| vec![Span::text(format!("a:{code}"))]);
        let b = ExtensionBundle::new().with_highlighter(|_, code| vec![Span::text(format!("b:{code}"))]);
        let merged = a.merge(b);
        let highlighter = merged.highlighter.expect("highlighter should be present");
        assert_eq!(highlighter("rust", "x"), vec![Span::text("b:x")]);
    }

    #[test]
    fn merging_keeps_an_earlier_highlighter_when_the_later_bundle_has_none() {
        let a = ExtensionBundle::new().with_highlighter(|_, code| vec![Span::text(format!("a:{code}"))]);
        let b = ExtensionBundle::new();
        let merged = a.merge(b);
        let highlighter = merged.highlighter.expect("highlighter should be present");
        assert_eq!(highlighter("rust", "x"), vec![Span::text("a:x")]);
    }
}
