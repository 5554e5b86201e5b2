//! Deep object merge (§4.6): `{ x { a:1 } } + { x { b:2 } } = { x { a:1, b:2 } }`.
//! Non-object values at the same key are overridden by the right-hand side,
//! matching a HOCON-style "later fallback wins per-leaf" merge.

use crate::value::ConfigValue;

pub fn deep_merge(base: &ConfigValue, overlay: &ConfigValue) -> ConfigValue {
    match (base, overlay) {
        (
            ConfigValue::Object {
                fields: base_fields,
                ..
            },
            ConfigValue::Object {
                fields: overlay_fields,
                origin,
            },
        ) => {
            let mut merged = base_fields.clone();
            for (key, overlay_value) in overlay_fields {
                match merged.get(key) {
                    Some(base_value) => {
                        merged.insert(key.clone(), deep_merge(base_value, overlay_value));
                    }
                    None => {
                        merged.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
            ConfigValue::Object {
                fields: merged,
                origin: origin.clone(),
            }
        }
        (_, overlay) => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::Origin;
    use std::collections::BTreeMap;

    fn obj(fields: Vec<(&str, ConfigValue)>) -> ConfigValue {
        ConfigValue::object(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
            Origin::Default,
        )
    }

    #[test]
    fn merges_disjoint_keys_of_a_nested_object() {
        let base = obj(vec![("x", obj(vec![("a", ConfigValue::int(1, Origin::Default))]))]);
        let overlay = obj(vec![("x", obj(vec![("b", ConfigValue::int(2, Origin::Default))]))]);
        let merged = deep_merge(&base, &overlay);
        let x = merged.get_raw("x").unwrap().as_object().unwrap();
        assert_eq!(x.len(), 2);
    }

    #[test]
    fn overlay_scalar_overrides_base_scalar() {
        let base = obj(vec![("a", ConfigValue::int(1, Origin::Default))]);
        let overlay = obj(vec![("a", ConfigValue::int(2, Origin::Default))]);
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged.get_raw("a").unwrap().as_int(), Some(2));
    }
}
