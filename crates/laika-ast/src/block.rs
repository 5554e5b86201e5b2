//! The `Block` AST category (§3.3): nodes occupying vertical space.

use crate::invalid::Invalid;
use crate::options::Options;
use crate::span::{LinkTarget, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    HeadCell,
    BodyCell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumFormat {
    Arabic,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    pub align: Alignment,
    pub content: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub content: Vec<Block>,
    pub options: Options,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionListItem {
    pub term: Vec<Span>,
    pub definition: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Span>, Options),

    Header {
        level: u8,
        content: Vec<Span>,
        options: Options,
    },

    Title(Vec<Span>, Options),

    BulletList {
        items: Vec<ListItem>,
        options: Options,
    },

    EnumList {
        items: Vec<ListItem>,
        start: i64,
        format: EnumFormat,
        options: Options,
    },

    DefinitionList {
        items: Vec<DefinitionListItem>,
        options: Options,
    },

    QuotedBlock {
        content: Vec<Block>,
        attribution: Vec<Span>,
        options: Options,
    },

    LiteralBlock(String, Options),

    /// A fenced/highlighted code block; `spans` holds the
    /// syntax-highlighted inline spans (plain `Text` if no highlighter is
    /// registered for `lang`), per §3.3's `CodeBlock(lang, code_spans)`.
    CodeBlock {
        lang: Option<String>,
        spans: Vec<Span>,
        options: Options,
    },

    Table {
        head: Vec<Row>,
        body: Vec<Row>,
        options: Options,
    },

    Rule(Options),

    Section {
        header: Box<Block>,
        content: Vec<Block>,
        options: Options,
    },

    BlockSequence(Vec<Block>, Options),

    RootElement(Vec<Block>),

    Footnote {
        label: crate::span::FootnoteLabel,
        content: Vec<Block>,
        options: Options,
    },

    Citation {
        key: String,
        content: Vec<Block>,
        options: Options,
    },

    LinkDefinition {
        id: String,
        target: LinkTarget,
        title: Option<String>,
    },

    /// A substitution definition (`.. |name| replace:: ...`, §4.3) — kept as
    /// a block so it can live alongside other explicit-block constructs
    /// before the rewrite phase consumes it.
    SubstitutionDefinition {
        name: String,
        content: Vec<Span>,
    },

    TemplateRoot(Vec<crate::template::TemplateElement>),

    Invalid(Invalid),
}

impl Block {
    pub fn children(&self) -> Option<&[Block]> {
        match self {
            Block::QuotedBlock { content, .. } => Some(content),
            Block::Section { content, .. } => Some(content),
            Block::BlockSequence(c, _) => Some(c),
            Block::RootElement(c) => Some(c),
            Block::Footnote { content, .. } => Some(content),
            Block::Citation { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::QuotedBlock { content, .. } => Some(content),
            Block::Section { content, .. } => Some(content),
            Block::BlockSequence(c, _) => Some(c),
            Block::RootElement(c) => Some(c),
            Block::Footnote { content, .. } => Some(content),
            Block::Citation { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Spans directly owned by this block (paragraphs, headers, titles);
    /// `None` for blocks whose content is other blocks or opaque text.
    pub fn own_spans(&self) -> Option<&[Span]> {
        match self {
            Block::Paragraph(spans, _) => Some(spans),
            Block::Header { content, .. } => Some(content),
            Block::Title(spans, _) => Some(spans),
            Block::CodeBlock { spans, .. } => Some(spans),
            Block::SubstitutionDefinition { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn own_spans_mut(&mut self) -> Option<&mut Vec<Span>> {
        match self {
            Block::Paragraph(spans, _) => Some(spans),
            Block::Header { content, .. } => Some(content),
            Block::Title(spans, _) => Some(spans),
            Block::CodeBlock { spans, .. } => Some(spans),
            Block::SubstitutionDefinition { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Block::Invalid(_))
    }
}
