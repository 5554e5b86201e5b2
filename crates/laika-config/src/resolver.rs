//! Lazy substitution resolution (§4.6): navigating a dot-separated path
//! into a config tree, expanding `${path}`/`${?path}` substitutions and
//! dependent values against the root config, and detecting cycles.

use log::trace;
use thiserror::Error;

use crate::origin::Origin;
use crate::value::ConfigValue;

/// A circular reference was found while resolving a substitution chain.
/// Surfaced as a single error at the deepest reachable point rather than
/// unwinding each frame individually.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("circular config reference: {}", cycle_paths.join(" -> "))]
pub struct ResolverFailed {
    pub cycle_paths: Vec<String>,
}

/// Resolves `path` against `root`, following substitution and dependent
/// references until a concrete value (or `Null`, for a missing optional
/// reference) is reached.
pub fn resolve(root: &ConfigValue, path: &str) -> Result<ConfigValue, ResolverFailed> {
    let mut visited = Vec::new();
    resolve_ref(root, path, &mut visited)
}

/// Resolves the value stored at `path`, pushing `path` onto `visited` for
/// the duration so any substitution reachable from it that points back at
/// `path` is caught as a cycle rather than recursing forever.
fn resolve_ref(
    root: &ConfigValue,
    path: &str,
    visited: &mut Vec<String>,
) -> Result<ConfigValue, ResolverFailed> {
    if visited.iter().any(|p| p == path) {
        let mut cycle = visited.clone();
        cycle.push(path.to_string());
        return Err(ResolverFailed { cycle_paths: cycle });
    }
    visited.push(path.to_string());
    let result = match root.get_raw(path) {
        None => Ok(ConfigValue::null(Origin::Default)),
        Some(value) => resolve_value(root, value, visited),
    };
    visited.pop();
    result
}

fn resolve_value(
    root: &ConfigValue,
    value: &ConfigValue,
    visited: &mut Vec<String>,
) -> Result<ConfigValue, ResolverFailed> {
    match value {
        ConfigValue::Substitution {
            path: target,
            optional,
            origin,
        } => {
            trace!("resolving substitution ${{{target}}}");
            match root.get_raw(target) {
                None if *optional => Ok(ConfigValue::null(origin.clone())),
                None => Ok(ConfigValue::null(origin.clone())),
                Some(_) => resolve_ref(root, target, visited),
            }
        }
        ConfigValue::Dependent { resolve, origin } => {
            trace!("resolving dependent value, origin {origin}");
            (resolve.0)(root).map_err(|msg| ResolverFailed {
                cycle_paths: vec![format!("dependent fn failed (origin {origin}): {msg}")],
            })
        }
        ConfigValue::Object { fields, origin } => {
            let mut resolved = std::collections::BTreeMap::new();
            for (key, v) in fields {
                resolved.insert(key.clone(), resolve_value(root, v, visited)?);
            }
            Ok(ConfigValue::Object {
                fields: resolved,
                origin: origin.clone(),
            })
        }
        ConfigValue::Array { items, origin } => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                resolved.push(resolve_value(root, item, visited)?);
            }
            Ok(ConfigValue::Array {
                items: resolved,
                origin: origin.clone(),
            })
        }
        leaf => Ok(leaf.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn obj(fields: Vec<(&str, ConfigValue)>) -> ConfigValue {
        ConfigValue::object(
            fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<BTreeMap<_, _>>(),
            Origin::Default,
        )
    }

    #[test]
    fn resolves_a_direct_substitution() {
        let root = obj(vec![
            ("a", ConfigValue::int(1, Origin::Default)),
            ("b", ConfigValue::substitution("a", false, Origin::Default)),
        ]);
        let resolved = resolve(&root, "b").unwrap();
        assert_eq!(resolved.as_int(), Some(1));
    }

    #[test]
    fn optional_substitution_to_missing_key_is_null() {
        let root = obj(vec![("b", ConfigValue::substitution("missing", true, Origin::Default))]);
        let resolved = resolve(&root, "b").unwrap();
        assert!(matches!(resolved, ConfigValue::Null { .. }));
    }

    #[test]
    fn detects_a_direct_cycle() {
        let root = obj(vec![
            ("a", ConfigValue::substitution("b", false, Origin::Default)),
            ("b", ConfigValue::substitution("a", false, Origin::Default)),
        ]);
        let err = resolve(&root, "a").unwrap_err();
        assert!(!err.cycle_paths.is_empty());
    }

    #[test]
    fn deep_object_merge_then_resolve_sees_both_branches() {
        let left = obj(vec![("x", obj(vec![("a", ConfigValue::int(1, Origin::Default))]))]);
        let right = obj(vec![("x", obj(vec![("b", ConfigValue::int(2, Origin::Default))]))]);
        let merged = crate::merge::deep_merge(&left, &right);
        let x = merged.get_raw("x").unwrap().as_object().unwrap();
        assert_eq!(x.get("a").unwrap().as_int(), Some(1));
        assert_eq!(x.get("b").unwrap().as_int(), Some(2));
    }
}
