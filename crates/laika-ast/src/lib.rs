//! The shared AST (L2): the `Block`/`Span`/`Template` sum types, their
//! common `Options`/`SourceFragment` machinery, the rewrite primitive that
//! all higher layers use to transform trees, the virtual document tree,
//! and the style cascade.

pub mod block;
pub mod document;
pub mod fragment;
pub mod invalid;
pub mod options;
pub mod path;
pub mod rewrite;
pub mod span;
pub mod style;
pub mod template;

pub use block::{Alignment, Block, Cell, CellKind, DefinitionListItem, EnumFormat, ListItem, Row};
pub use document::{Document, DocumentTree, DocumentTreeNode, DocumentTreeRoot, Element};
pub use fragment::SourceFragment;
pub use invalid::{Invalid, Severity};
pub use options::Options;
pub use path::{path, Path};
pub use rewrite::{rewrite_blocks, rewrite_spans, rewrite_spans_in_blocks, Action};
pub use span::{FootnoteLabel, LinkTarget, Span};
pub use style::{
    Combinator, CompoundSelector, Declaration, NodeDescriptor, Selector, SimpleSelector,
    Specificity, StyleDeclarationSet,
};
pub use template::TemplateElement;
