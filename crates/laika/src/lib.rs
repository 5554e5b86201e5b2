//! The facade crate: wires `laika-markup`'s front ends, `laika-rewrite`'s
//! phase runner, `laika-config`'s value model and `laika-render`'s renderer
//! hook interface behind the five-operation Transformer API (§6.1).
//!
//! Application code builds one [`Transformer`], optionally calling
//! `with_config_value`/`using` to configure it, then calls `parse`,
//! `parse_unresolved`, or `transform` per document.

pub mod bundle;
pub mod config;
pub mod transformer;

pub use bundle::{ExtensionBundle, Highlighter, RewriteRule};
pub use transformer::{Document, Transformer};

pub use laika_config::{ConfigValue, Origin};
pub use laika_markup::{DirectiveRegistry, Format, RoleRegistry};
pub use laika_render::{AstDumpRenderer, HtmlRenderer, RenderBackend, RendererOverrides};
pub use laika_rewrite::{Filters, InvalidDocument};
