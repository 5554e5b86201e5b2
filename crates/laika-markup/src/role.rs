//! The text-role framework (§4.4): RST's `` `text`:role: `` interpreted
//! text resolves against a registry of named roles, each a function from
//! the interpreted text to a `Span`, with a configurable set of named
//! fields (e.g. a custom `:rfc:` role fixing a URL template).

use std::collections::BTreeMap;
use std::rc::Rc;

use laika_ast::{Invalid, SourceFragment, Span};

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Str(String),
}

pub struct TextRole {
    pub name: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub build: Rc<dyn Fn(&str, &BTreeMap<String, FieldValue>) -> Span>,
}

impl TextRole {
    pub fn new(name: impl Into<String>, build: impl Fn(&str, &BTreeMap<String, FieldValue>) -> Span + 'static) -> Self {
        TextRole { name: name.into(), fields: BTreeMap::new(), build: Rc::new(build) }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

#[derive(Default)]
pub struct RoleRegistry {
    roles: BTreeMap<String, TextRole>,
    default_role: Option<String>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        RoleRegistry::default()
    }

    pub fn register(&mut self, role: TextRole) {
        self.roles.insert(role.name.clone(), role);
    }

    pub fn merge(&mut self, other: RoleRegistry) {
        self.roles.extend(other.roles);
        if other.default_role.is_some() {
            self.default_role = other.default_role;
        }
    }

    pub fn set_default_role(&mut self, name: impl Into<String>) {
        self.default_role = Some(name.into());
    }

    pub fn get(&self, name: &str) -> Option<&TextRole> {
        self.roles.get(name)
    }

    /// Resolves interpreted text against a role name, falling back to the
    /// registry's default role when `role` is `None`.
    pub fn apply(&self, text: &str, role: Option<&str>, source: SourceFragment) -> Span {
        let resolved_name = role.map(str::to_string).or_else(|| self.default_role.clone());
        match resolved_name.as_deref().and_then(|n| self.get(n)) {
            Some(r) => (r.build)(text, &r.fields),
            None => {
                let name = resolved_name.unwrap_or_else(|| "<none>".to_string());
                Span::Invalid(Invalid::warning(format!("unknown text role '{name}'"), source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laika_ast::Options;

    #[test]
    fn applies_a_registered_role() {
        let mut registry = RoleRegistry::new();
        registry.register(TextRole::new("sup", |text, _| Span::Emphasized(vec![Span::Text(text.to_string())], Options::empty())));
        let span = registry.apply("2nd", Some("sup"), SourceFragment::synthetic("`2nd`:sup:"));
        assert!(matches!(span, Span::Emphasized(..)));
    }

    #[test]
    fn falls_back_to_the_default_role() {
        let mut registry = RoleRegistry::new();
        registry.register(TextRole::new("code", |text, _| Span::Literal(text.to_string(), Options::empty())));
        registry.set_default_role("code");
        let span = registry.apply("x", None, SourceFragment::synthetic("`x`"));
        assert!(matches!(span, Span::Literal(..)));
    }

    #[test]
    fn unknown_role_becomes_an_invalid_span() {
        let registry = RoleRegistry::new();
        let span = registry.apply("x", Some("nope"), SourceFragment::synthetic("`x`:nope:"));
        assert!(span.is_invalid());
    }
}
