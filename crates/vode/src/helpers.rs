//! Class and style value helpers.

use compact_str::CompactString;
use serde_json::{Map, Value};
use vode_dom::css::{parse_declarations, serialize_declarations, set_declaration, Declarations};

/// JavaScript-style truthiness of a JSON value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Flatten a class value: a string, an array of class values, or a map
/// of class names to flags.
pub fn class_string(class: &Value) -> String {
    match class {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(class_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => map
            .iter()
            .filter(|(_, on)| truthy(on))
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

/// Merge class values of any shape, left to right.
///
/// Two lists of names (strings or arrays) merge into one deduplicated
/// string. As soon as a map is involved the result is a map, with names from
/// lists switched on and later flags winning. Falsy and non-class values are
/// skipped.
pub fn merge_class<'a>(classes: impl IntoIterator<Item = &'a Value>) -> Value {
    classes.into_iter().fold(Value::Null, |merged, class| {
        if !truthy(class) {
            return merged;
        }
        match (merged, class) {
            (Value::Null, next @ (Value::String(_) | Value::Array(_) | Value::Object(_))) => next.clone(),
            (Value::Object(mut map), Value::Object(next)) => {
                map.extend(next.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(map)
            }
            (Value::Object(mut map), names @ (Value::String(_) | Value::Array(_))) => {
                for name in class_names(names) {
                    map.insert(name, Value::Bool(true));
                }
                Value::Object(map)
            }
            (names @ (Value::String(_) | Value::Array(_)), Value::Object(next)) => {
                let mut map: Map<String, Value> =
                    class_names(&names).into_iter().map(|n| (n, Value::Bool(true))).collect();
                map.extend(next.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(map)
            }
            (names @ (Value::String(_) | Value::Array(_)), next @ (Value::String(_) | Value::Array(_))) => {
                let mut all = class_names(&names);
                for name in class_names(next) {
                    if !all.contains(&name) {
                        all.push(name);
                    }
                }
                Value::String(all.join(" "))
            }
            (merged, _) => merged,
        }
    })
}

fn class_names(value: &Value) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in class_string(value).split_whitespace() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Merge style values (strings in `cssText` form or camelCase maps) into
/// one `cssText` string. Later declarations win.
pub fn merge_style<'a>(styles: impl IntoIterator<Item = &'a Value>) -> String {
    let mut decls = Declarations::new();
    for style in styles {
        match style {
            Value::String(text) => {
                for (name, value) in parse_declarations(text) {
                    set_declaration(&mut decls, &name, Some(value.as_str()));
                }
            }
            Value::Object(map) => {
                for (key, value) in map {
                    set_declaration(&mut decls, &style_key(key), style_value(value).as_deref());
                }
            }
            _ => {}
        }
    }
    serialize_declarations(&decls)
}

/// camelCase style property name to its kebab-case CSS name.
///
/// Names that already are kebab-case are returned unchanged.
pub fn style_key(key: &str) -> CompactString {
    let mut out = CompactString::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// CSS text of a style map value; `None` clears the declaration.
pub(crate) fn style_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
