//! The `Template` AST category (§3.3): the third closed sum type, used by
//! theme templates that splice rendered document content and resolved
//! configuration values into a surrounding HTML/FO shell.

use crate::invalid::Invalid;
use crate::options::Options;
use crate::span::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateElement {
    /// Literal text copied to the output verbatim.
    TemplateString(String),

    /// A document span spliced into the template (e.g. a resolved document
    /// title).
    TemplateSpan(Span, Options),

    /// A reference into the resolved configuration (`${...}`, §3.5),
    /// substituted when the template is applied to a document.
    ContextReference { path: String, options: Options },

    /// A nested sequence, e.g. the contents of a conditional block.
    TemplateRoot(Vec<TemplateElement>),

    Invalid(Invalid),
}

impl TemplateElement {
    pub fn children(&self) -> Option<&[TemplateElement]> {
        match self {
            TemplateElement::TemplateRoot(c) => Some(c),
            _ => None,
        }
    }
}
