//! Deep merge for configuration overlays.
//!
//! The merged store is built by folding the three sources from lowest to
//! highest precedence: file contents, then environment variables, then
//! command-line arguments.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in the overlay override keys in
///   the base, keys absent from the overlay fall through unchanged
/// - Arrays, strings, numbers, and booleans are replaced entirely
/// - A null overlay preserves the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use conf_cascade::deep_merge;
///
/// let file = json!({ "db": { "host": "localhost", "port": 5432 } });
/// let env = json!({ "db": { "host": "db.internal" } });
/// let merged = deep_merge(file, env);
/// // { "db": { "host": "db.internal", "port": 5432 } }
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
