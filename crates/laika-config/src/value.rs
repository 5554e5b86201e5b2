//! The `ConfigValue` model (§3.5): a nested key/value tree where every
//! value carries an [`Origin`] and string values may defer to a
//! substitution (`${name}`/`${?name}`) resolved lazily against a root
//! config (§4.6).

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::origin::Origin;

/// A config value that embeds an AST node — the "AST-value" variant §3.5
/// calls for, used by config keys that carry document content (e.g. a
/// themed navigation fragment).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AstValue {
    Block(laika_ast::Block),
    Span(laika_ast::Span),
    Template(laika_ast::TemplateElement),
}

/// A config value computed as a function of the fully-resolved root config
/// (§4.6's "dependent values"). Wrapped so the enclosing `ConfigValue` can
/// still derive `Clone`/`Debug`/`PartialEq`/`Eq` — equality and display
/// fall back to reference identity, since the closure itself carries no
/// inspectable state.
#[derive(Clone)]
pub struct DependentFn(pub Rc<dyn Fn(&ConfigValue) -> Result<ConfigValue, String>>);

impl std::fmt::Debug for DependentFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<dependent config fn>")
    }
}

impl PartialEq for DependentFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DependentFn {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigValue {
    Null {
        origin: Origin,
    },
    Bool {
        value: bool,
        origin: Origin,
    },
    Int {
        value: i64,
        origin: Origin,
    },
    Double {
        value: u64, // bit pattern of the f64, so `ConfigValue` can derive `Eq`
        origin: Origin,
    },
    String {
        value: String,
        origin: Origin,
    },
    Array {
        items: Vec<ConfigValue>,
        origin: Origin,
    },
    Object {
        fields: BTreeMap<String, ConfigValue>,
        origin: Origin,
    },
    Ast {
        value: AstValue,
        origin: Origin,
    },
    /// An unresolved `${path}` (or `${?path}` when `optional`) reference,
    /// §4.6's "Unresolved" `FieldRef` kind.
    Substitution {
        path: String,
        optional: bool,
        origin: Origin,
    },
    /// An unresolved value defined as a function of the final, resolved
    /// root config — §4.6's other "Unresolved" kind.
    Dependent {
        resolve: DependentFn,
        origin: Origin,
    },
}

impl ConfigValue {
    pub fn null(origin: Origin) -> Self {
        ConfigValue::Null { origin }
    }

    pub fn bool(value: bool, origin: Origin) -> Self {
        ConfigValue::Bool { value, origin }
    }

    pub fn int(value: i64, origin: Origin) -> Self {
        ConfigValue::Int { value, origin }
    }

    pub fn double(value: f64, origin: Origin) -> Self {
        ConfigValue::Double {
            value: value.to_bits(),
            origin,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            ConfigValue::Double { value, .. } => Some(f64::from_bits(*value)),
            _ => None,
        }
    }

    pub fn string(value: impl Into<String>, origin: Origin) -> Self {
        ConfigValue::String {
            value: value.into(),
            origin,
        }
    }

    pub fn empty_object() -> Self {
        ConfigValue::Object {
            fields: BTreeMap::new(),
            origin: Origin::Default,
        }
    }

    pub fn object(fields: BTreeMap<String, ConfigValue>, origin: Origin) -> Self {
        ConfigValue::Object { fields, origin }
    }

    pub fn substitution(path: impl Into<String>, optional: bool, origin: Origin) -> Self {
        ConfigValue::Substitution {
            path: path.into(),
            optional,
            origin,
        }
    }

    pub fn origin(&self) -> &Origin {
        match self {
            ConfigValue::Null { origin }
            | ConfigValue::Bool { origin, .. }
            | ConfigValue::Int { origin, .. }
            | ConfigValue::Double { origin, .. }
            | ConfigValue::String { origin, .. }
            | ConfigValue::Array { origin, .. }
            | ConfigValue::Object { origin, .. }
            | ConfigValue::Ast { origin, .. }
            | ConfigValue::Substitution { origin, .. }
            | ConfigValue::Dependent { origin, .. } => origin,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Navigates a dot-separated path (`"a.b.c"`) into nested objects
    /// without resolving substitutions; used internally by the resolver to
    /// walk a root config it already holds by reference.
    pub fn get_raw(&self, path: &str) -> Option<&ConfigValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}
