//! Canonical JSON encoding for hashing
//!
//! Semantically identical event data must always hash identically, so the
//! event payload is rendered with recursively sorted object keys and no
//! whitespace before it enters the hash. This encoding is part of the
//! ledger's wire format: changing it invalidates every historical hash.

use serde_json::Value;

/// Render a JSON value canonically: object keys sorted recursively,
/// compact separators, serde_json's default number/string formatting.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Key encoding via serde_json keeps escaping consistent
                // with the value encoding below.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars already have a single stable rendering
        other => out.push_str(&other.to_string()),
    }
}
