//! The `Span` AST category (§3.3): inline content within a block.

use crate::fragment::SourceFragment;
use crate::invalid::Invalid;
use crate::options::Options;
use crate::path::Path;

/// Where a link or image points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    External(String),
    Internal(Path),
}

/// How a footnote/citation/autonumber reference identifies its target,
/// prior to resolution (§4.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FootnoteLabel {
    Numeric(u32),
    AutoNumber,
    AutoSymbol,
    AutoNumberNamed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Emphasized(Vec<Span>, Options),
    Strong(Vec<Span>, Options),

    /// GFM strikethrough, `~~text~~` (§4.3's GitHub-flavored addition).
    Strikethrough(Vec<Span>, Options),

    Literal(String, Options),
    LineBreak(Options),

    /// Inline code, optionally syntax-highlighted: `spans` are the
    /// highlighted sub-spans (plain `Text` if no highlighter ran).
    InlineCode {
        lang: Option<String>,
        spans: Vec<Span>,
        options: Options,
    },

    SpanLink {
        content: Vec<Span>,
        target: LinkTarget,
        title: Option<String>,
        options: Options,
    },

    Image {
        target: LinkTarget,
        alt: Option<String>,
        title: Option<String>,
        options: Options,
    },

    /// `formats` names the output formats this raw content applies to
    /// (e.g. `["html"]`); renderers for other formats drop it.
    RawContent {
        formats: Vec<String>,
        content: String,
        options: Options,
    },

    /// A block-pass placeholder: the captured textual range of an inline
    /// region, not yet expanded by the span pass (§4.3's two-pass
    /// discipline). `rewrite_spans` replaces this with the parsed spans via
    /// `Action::ReplaceMany`.
    UnresolvedSpanSequence(SourceFragment),

    /// An unresolved `[id]`-style link reference, pending lookup against the
    /// document's link-definition map.
    LinkIdReference {
        id: String,
        content: Vec<Span>,
        source: SourceFragment,
    },

    /// An unresolved `|name|`-style substitution reference.
    SubstitutionReference { name: String, source: SourceFragment },

    /// An unresolved footnote reference.
    FootnoteReference { label: FootnoteLabel, source: SourceFragment },

    /// An unresolved citation reference (`[citation_key]_` in RST).
    CitationReference { key: String, source: SourceFragment },

    /// Unresolved reStructuredText interpreted text, `` `text`:role: ``.
    InterpretedText {
        text: String,
        role: Option<String>,
        source: SourceFragment,
    },

    /// A resolved footnote reference, after the Resolve phase assigns it a
    /// concrete displayed label (e.g. `2` or `*`).
    FootnoteLink {
        target_id: String,
        label: String,
        options: Options,
    },

    /// A resolved citation reference.
    CitationLink {
        target_id: String,
        label: String,
        options: Options,
    },

    Invalid(Invalid),
}

impl Span {
    pub fn text(s: impl Into<String>) -> Span {
        Span::Text(s.into())
    }

    pub fn options(&self) -> Option<&Options> {
        match self {
            Span::Emphasized(_, o)
            | Span::Strong(_, o)
            | Span::Strikethrough(_, o)
            | Span::Literal(_, o)
            | Span::LineBreak(o)
            | Span::InlineCode { options: o, .. }
            | Span::SpanLink { options: o, .. }
            | Span::Image { options: o, .. }
            | Span::RawContent { options: o, .. }
            | Span::FootnoteLink { options: o, .. }
            | Span::CitationLink { options: o, .. } => Some(o),
            _ => None,
        }
    }

    /// Spans that act as containers expose their children homogeneously
    /// (§3.3's invariant); leaves return `None`.
    pub fn children(&self) -> Option<&[Span]> {
        match self {
            Span::Emphasized(c, _) | Span::Strong(c, _) | Span::Strikethrough(c, _) => Some(c),
            Span::InlineCode { spans, .. } => Some(spans),
            Span::SpanLink { content, .. } => Some(content),
            Span::LinkIdReference { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Span>> {
        match self {
            Span::Emphasized(c, _) | Span::Strong(c, _) | Span::Strikethrough(c, _) => Some(c),
            Span::InlineCode { spans, .. } => Some(spans),
            Span::SpanLink { content, .. } => Some(content),
            Span::LinkIdReference { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Span::Invalid(_))
    }
}
