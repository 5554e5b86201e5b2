//! Dot-path insertion into a [`ConfigValue`] object tree, backing
//! `Transformer::with_config_value` (§6.1). Resolution/substitution/merge
//! themselves are `laika-config`'s job; this is just the write side a
//! facade needs to accept `("a.b.c", value)` pairs one at a time.

use std::collections::BTreeMap;

use laika_config::{ConfigValue, Origin};

/// Sets `path` (dot-separated) to `value` inside `root`, creating
/// intermediate objects as needed. `root` must already be (or become) an
/// `Object`; any non-object value at an intermediate segment is replaced.
pub fn set_path(root: &mut ConfigValue, path: &str, value: ConfigValue) {
    let segments: Vec<&str> = path.split('.').collect();
    set_segments(root, &segments, value);
}

fn set_segments(root: &mut ConfigValue, segments: &[&str], value: ConfigValue) {
    let fields = ensure_object(root);
    match segments {
        [] => unreachable!("set_path is never called with an empty path"),
        [last] => {
            fields.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let child = fields
                .entry(head.to_string())
                .or_insert_with(ConfigValue::empty_object);
            set_segments(child, rest, value);
        }
    }
}

fn ensure_object(value: &mut ConfigValue) -> &mut BTreeMap<String, ConfigValue> {
    if !matches!(value, ConfigValue::Object { .. }) {
        *value = ConfigValue::empty_object();
    }
    match value {
        ConfigValue::Object { fields, .. } => fields,
        _ => unreachable!("just normalized to an Object above"),
    }
}

pub fn api_string(value: impl Into<String>) -> ConfigValue {
    ConfigValue::string(value, Origin::Api)
}

pub fn api_bool(value: bool) -> ConfigValue {
    ConfigValue::bool(value, Origin::Api)
}

pub fn api_int(value: i64) -> ConfigValue {
    ConfigValue::int(value, Origin::Api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_a_nested_path_creating_intermediate_objects() {
        let mut root = ConfigValue::empty_object();
        set_path(&mut root, "laika.autosectionnumbering", api_bool(true));
        let resolved = root.get_raw("laika.autosectionnumbering").unwrap();
        assert_eq!(resolved.as_bool(), Some(true));
    }

    #[test]
    fn overwriting_a_leaf_does_not_disturb_sibling_keys() {
        let mut root = ConfigValue::empty_object();
        set_path(&mut root, "a.x", api_int(1));
        set_path(&mut root, "a.y", api_int(2));
        set_path(&mut root, "a.x", api_int(3));
        let a = root.get_raw("a").unwrap().as_object().unwrap();
        assert_eq!(a.get("x").unwrap().as_int(), Some(3));
        assert_eq!(a.get("y").unwrap().as_int(), Some(2));
    }
}
