//! Multi-layer override resolution
//!
//! [`resolve`] produces one merged tree for an entity from the three source
//! layers, with strict precedence: instance fields > extends-template fields
//! > global defaults, first match wins per field.
//!
//! Merging happens on the flattened key space, so it behaves like a deep
//! merge at leaf granularity: a nested object path is just another dotted
//! key, and a donor leaf fills in only where the winning layer has no leaf
//! at that exact path.

use serde_json::Value;

use overlay_tree::{FlatMap, expand, flatten};

use crate::source::{EXTENDS_KEY, OverlaySource};

/// Resolve the effective configuration tree for one entity.
///
/// Layer selection:
///
/// 1. An instance entry whose `id` equals `entity_id` wins; its `extends`
///    template (if any) and then the defaults fill in missing leaves. A
///    dangling `extends` reference is logged as a warning and skipped.
/// 2. Otherwise a template named exactly `entity_id` wins, filled in from
///    the defaults.
/// 3. Otherwise the defaults tree (with the entity id injected) is returned
///    unchanged.
///
/// The bookkeeping `extends` field is consumed here and does not appear in
/// the resolved tree.
pub fn resolve(entity_id: &str, source: &OverlaySource) -> Value {
    let defaults = flatten(&source.defaults_for(entity_id), &[]);

    if let Some(instance) = source.instance_for(entity_id) {
        let mut merged = flatten(instance, &[]);
        if let Some(template_name) = instance.get(EXTENDS_KEY).and_then(Value::as_str) {
            merged.remove(EXTENDS_KEY);
            match source.template(template_name) {
                Some(template) => copy_missing(&flatten(template, &[]), &mut merged),
                None => tracing::warn!(
                    entity = entity_id,
                    template = template_name,
                    "extends references an unknown template; skipping that layer"
                ),
            }
        }
        copy_missing(&defaults, &mut merged);
        return expand(&merged, &[]);
    }

    if let Some(template) = source.template(entity_id) {
        let mut merged = flatten(template, &[]);
        copy_missing(&defaults, &mut merged);
        return expand(&merged, &[]);
    }

    source.defaults_for(entity_id)
}

/// Copy every donor leaf absent from the target; present leaves are never
/// overwritten.
fn copy_missing(donor: &FlatMap, target: &mut FlatMap) {
    for (key, value) in donor.iter() {
        if !target.contains_key(key) {
            target.insert(key, value);
        }
    }
}
