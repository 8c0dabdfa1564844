//! Cross-crate pipeline tests: parsed documents through the codec and
//! resolver public APIs.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use overlay_engine::{OverlaySource, resolve};
use overlay_tree::{expand, flatten};

#[test]
fn yaml_document_survives_flatten_expand() {
    let tree: Value = serde_yaml::from_str(
        r#"
transport:
  hosts: [h1, h2]
  port: 9400
scheduler:
  policy: fifo
  preemptive: false
"#,
    )
    .unwrap();

    let flat = flatten(&tree, &[]);
    assert_eq!(flat.get("transport.hosts.0"), Some("h1"));
    assert_eq!(flat.get("transport.hosts.1"), Some("h2"));
    assert_eq!(flat.get("scheduler.preemptive"), Some("false"));
    assert_eq!(expand(&flat, &[]), tree);
}

#[test]
fn override_precedence_matches_layer_order() {
    let source: OverlaySource = serde_yaml::from_str(
        r#"
instances:
  - id: A
    extends: T1
    foo: instance
templates:
  T1:
    foo: template
    bar: T1
defaults:
  foo: default
  bar: default
  baz: default
"#,
    )
    .unwrap();

    assert_eq!(
        resolve("A", &source),
        json!({"id": "A", "foo": "instance", "bar": "T1", "baz": "default"})
    );
}

#[test]
fn resolution_is_idempotent_for_a_fixed_snapshot() {
    let source: OverlaySource = serde_yaml::from_str(
        "templates:\n  X:\n    foo: template\ndefaults:\n  bar: default\n",
    )
    .unwrap();

    let first = resolve("X", &source);
    let second = resolve("X", &source);
    assert_eq!(first, second);
    assert_eq!(first, json!({"foo": "template", "bar": "default", "id": "X"}));
}
