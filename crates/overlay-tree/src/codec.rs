//! Bidirectional conversion between trees and flat maps
//!
//! [`flatten`] and [`expand`] are inverses over canonical inputs: trees whose
//! arrays use contiguous zero-based indices, and flat maps where no key is a
//! strict prefix of another. Number formatting is not preserved across a
//! round trip (`"1.0"` may come back as `1`); that is an accepted lossy
//! boundary.

use serde_json::{Map, Value};

use crate::flat::{FlatMap, SEPARATOR};

/// Flatten a tree into a dotted-key property map.
///
/// Object nodes recurse into `key.child`, array nodes use the element's
/// positional index as the next segment, scalars terminate recursion with
/// their text representation and `Null` writes the literal token `"null"`.
/// Output order is the discovery order of the source tree.
///
/// `base` is prepended to every produced key; pass `&[]` to flatten at the
/// root. A bare scalar root flattens under the empty path, an empty tree
/// produces an empty map.
pub fn flatten(tree: &Value, base: &[&str]) -> FlatMap {
    let mut out = FlatMap::new();
    flatten_into(tree, &base.join("."), &mut out);
    out
}

fn flatten_into(node: &Value, path: &str, out: &mut FlatMap) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, &join(path, key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, &join(path, &index.to_string()), out);
            }
        }
        Value::Null => out.insert(path, "null"),
        Value::Bool(flag) => out.insert(path, flag.to_string()),
        Value::Number(number) => out.insert(path, number.to_string()),
        Value::String(text) => out.insert(path, text.clone()),
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}{SEPARATOR}{segment}")
    }
}

/// Expand a dotted-key property map back into a tree.
///
/// Keys are stripped of the `base` prefix; keys outside the prefix are
/// dropped. Scalar text is coerced back: integer- and float-looking values
/// become numbers, `"true"`/`"false"` become booleans, `"null"` becomes
/// null, everything else stays a string. Intermediate object nodes are
/// created on demand.
///
/// After all keys are absorbed, a bottom-up post-pass converts every object
/// whose key set is exactly `{ "0", "1", ..., "n-1" }` into an array ordered
/// by index, so nested arrays-of-arrays are detected correctly.
///
/// A map whose only surviving key is `""` expands to that bare scalar.
pub fn expand(flat: &FlatMap, base: &[&str]) -> Value {
    let prefix = base.join(".");
    let mut root = Map::new();
    let mut bare_scalar = None;

    for (key, raw) in flat.iter() {
        let Some(key) = strip_base(key, &prefix) else {
            continue;
        };
        let leaf = coerce_scalar(raw);
        if key.is_empty() {
            bare_scalar = Some(leaf);
            continue;
        }
        let (parent, segment) = match key.rfind(SEPARATOR) {
            Some(split) => (&key[..split], &key[split + 1..]),
            None => ("", key),
        };
        descend(&mut root, parent).insert(segment.to_string(), leaf);
    }

    if root.is_empty() {
        if let Some(scalar) = bare_scalar {
            return scalar;
        }
    }
    collapse_arrays(Value::Object(root))
}

fn strip_base<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(key);
    }
    if key == prefix {
        return Some("");
    }
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
}

/// Walk (creating on demand) the chain of object nodes named by `parent`.
///
/// A non-object node in the way is replaced by an empty object; that only
/// happens on inputs violating the no-prefix invariant, where structural
/// keys win over a previously written scalar.
fn descend<'a>(root: &'a mut Map<String, Value>, parent: &str) -> &'a mut Map<String, Value> {
    let mut current = root;
    if parent.is_empty() {
        return current;
    }
    for segment in parent.split(SEPARATOR) {
        let child = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        current = match child {
            Value::Object(map) => map,
            _ => unreachable!("child was just made an object"),
        };
    }
    current
}

fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                return Value::Number(int.into());
            }
            if let Ok(int) = raw.parse::<u64>() {
                return Value::Number(int.into());
            }
            if let Ok(float) = raw.parse::<f64>() {
                if let Some(number) = serde_json::Number::from_f64(float) {
                    return Value::Number(number);
                }
            }
            Value::String(raw.to_string())
        }
    }
}

/// Bottom-up pass converting dense zero-based integer-keyed objects into
/// arrays. Children are collapsed before their parents so nested arrays are
/// detected from already-collapsed subtrees.
fn collapse_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut collapsed = Map::new();
            for (key, child) in map {
                collapsed.insert(key, collapse_arrays(child));
            }
            match dense_index_keys(&collapsed) {
                Some(ordered_keys) => Value::Array(
                    ordered_keys
                        .iter()
                        .filter_map(|key| collapsed.remove(key))
                        .collect(),
                ),
                None => Value::Object(collapsed),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(collapse_arrays).collect()),
        scalar => scalar,
    }
}

/// If the object's keys are exactly the canonical decimal forms of
/// `0..n-1`, return them ordered by index; otherwise `None`.
fn dense_index_keys(map: &Map<String, Value>) -> Option<Vec<String>> {
    if map.is_empty() {
        return None;
    }
    let mut indexed: Vec<(usize, String)> = Vec::with_capacity(map.len());
    for key in map.keys() {
        let index = key.parse::<usize>().ok()?;
        // Reject non-canonical spellings like "01".
        if index.to_string() != *key {
            return None;
        }
        indexed.push((index, key.clone()));
    }
    indexed.sort_by_key(|(index, _)| *index);
    for (position, (index, _)) in indexed.iter().enumerate() {
        if *index != position {
            return None;
        }
    }
    Some(indexed.into_iter().map(|(_, key)| key).collect())
}
