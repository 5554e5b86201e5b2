//! The `Options` record every AST node carries (§3.3): an optional id and a
//! set of styles (CSS-class-like tags consulted by the style cascade, §4.7).

use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub id: Option<String>,
    pub styles: BTreeSet<String>,
}

impl Options {
    pub fn empty() -> Self {
        Options::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Options {
            id: Some(id.into()),
            styles: BTreeSet::new(),
        }
    }

    pub fn with_styles(styles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Options {
            id: None,
            styles: styles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.styles.contains(style)
    }
}
