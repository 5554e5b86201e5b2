//! The document tree (§3.4): the hierarchy of parsed documents keyed by
//! virtual paths.
//!
//! `Document`/`DocumentTree`/`DocumentTreeRoot` are generic over the config
//! representation they carry (`Config` in §3.5's `Config` record). This
//! crate sits below `laika-config` in the dependency order — and
//! `ConfigValue` itself carries AST nodes back (the "AST-value" variant) —
//! so a concrete `config: ConfigValue` field here would close a dependency
//! cycle. `laika-config` and the facade crate monomorphize this over their
//! concrete `ConfigValue` instead (`Document<ConfigValue>`).

use std::collections::BTreeMap;

use crate::block::Block;
use crate::path::Path;
use crate::span::Span;
use crate::template::TemplateElement;

/// An element reachable by name from a document's `fragments` map — an
/// extracted subtree (e.g. an excerpt referenced from elsewhere) that isn't
/// part of the document's main content flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Block(Block),
    Span(Span),
    Template(TemplateElement),
}

/// A single parsed document: its virtual path, resolved content, any named
/// fragments extracted from it, and the config it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document<Config> {
    pub path: Path,
    /// Always a `Block::RootElement` once parsing completes; kept as plain
    /// `Block` so the rewrite primitive's generic block operations apply
    /// without a special case.
    pub content: Block,
    pub fragments: BTreeMap<String, Element>,
    pub config: Config,
}

impl<Config> Document<Config> {
    pub fn new(path: Path, content: Block, config: Config) -> Self {
        Document {
            path,
            content,
            fragments: BTreeMap::new(),
            config,
        }
    }
}

/// A directory-like grouping of documents and nested trees, keyed by the
/// path segment each child occupies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTree<Config> {
    pub path: Path,
    pub children: Vec<DocumentTreeNode<Config>>,
    pub config: Config,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentTreeNode<Config> {
    Tree(DocumentTree<Config>),
    Document(Document<Config>),
}

/// The root of a whole document hierarchy, as handed to a renderer that
/// needs to resolve cross-document links and navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTreeRoot<Config> {
    pub children: Vec<DocumentTreeNode<Config>>,
    pub config: Config,
}

impl<Config> DocumentTreeRoot<Config> {
    /// Finds a document by its exact virtual path, searching recursively.
    pub fn find(&self, target: &Path) -> Option<&Document<Config>> {
        fn search<'a, Config>(
            nodes: &'a [DocumentTreeNode<Config>],
            target: &Path,
        ) -> Option<&'a Document<Config>> {
            for node in nodes {
                match node {
                    DocumentTreeNode::Document(doc) if &doc.path == target => return Some(doc),
                    DocumentTreeNode::Tree(tree) => {
                        if let Some(found) = search(&tree.children, target) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        search(&self.children, target)
    }
}
