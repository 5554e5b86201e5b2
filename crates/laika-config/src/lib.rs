//! HOCON-like configuration model (L5): `ConfigValue`, `Origin` tracking,
//! lazy substitution resolution with cycle detection, deep object merge,
//! and a text-syntax parser (§3.5, §4.6, §6.4).

pub mod merge;
pub mod origin;
pub mod resolver;
pub mod text;
pub mod value;

pub use merge::deep_merge;
pub use origin::Origin;
pub use resolver::{resolve, ResolverFailed};
pub use text::{parse, parse_with_includes, IncludeLoader, ParseError};
pub use value::{AstValue, ConfigValue, DependentFn};

/// A document whose `config` field is a fully-typed `ConfigValue` (§3.4),
/// monomorphizing `laika_ast::Document`'s generic `Config` parameter —
/// see `DESIGN.md` for why `Document` itself lives one layer down.
pub type Document = laika_ast::Document<ConfigValue>;
pub type DocumentTree = laika_ast::DocumentTree<ConfigValue>;
pub type DocumentTreeNode = laika_ast::DocumentTreeNode<ConfigValue>;
pub type DocumentTreeRoot = laika_ast::DocumentTreeRoot<ConfigValue>;
