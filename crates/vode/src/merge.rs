//! Deep merge of render patches.

use serde_json::{Map, Value};

/// Merge `source` into `target`.
///
/// Nested objects merge recursively into existing objects and replace
/// anything else; arrays replace wholesale. A `null` leaf deletes the key
/// when `allow_deletion` is set and is stored as `null` otherwise, so two
/// queued patches compose without losing a pending deletion.
pub(crate) fn merge_state(target: &mut Map<String, Value>, source: Map<String, Value>, allow_deletion: bool) {
    for (key, value) in source {
        match value {
            Value::Object(object) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge_state(existing, object, allow_deletion),
                _ => {
                    let mut fresh = Map::new();
                    merge_state(&mut fresh, object, allow_deletion);
                    target.insert(key, Value::Object(fresh));
                }
            },
            Value::Null if allow_deletion => {
                target.remove(&key);
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}
