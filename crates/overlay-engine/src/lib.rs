//! Configuration resolution and binding engine for Overlay Manager
//!
//! This crate turns a nested overlay document into typed, cached
//! per-entity configuration:
//!
//! - **OverlaySource**: immutable snapshot of the `instances` / `templates`
//!   / `defaults` layers, loaded from one YAML or JSON file
//! - **Resolver**: merges the layers for one entity on the flattened key
//!   space, with instance > extends-template > defaults precedence
//! - **Descriptor/Binder**: binds the merged flat map against a static key
//!   table and answers typed lookups with lazy convert-and-memoize
//! - **ScopeCache**: shares bound accessors at a configurable granularity
//!   with single-flight construction
//!
//! # Architecture
//!
//! ```text
//! overlay.yaml ──▶ OverlaySource ──▶ resolver::resolve ──▶ flatten
//!                      ▲                                      │
//!                   ArcSwap                                   ▼
//!                   (reload)          ScopeCache ◀── Accessor::bind
//!                                         │
//!                                         ▼
//!                                  consumer (typed methods)
//! ```
//!
//! `overlay-engine` sits above `overlay-tree` (the pure tree/flat-map
//! codec) and below any consumer such as the CLI.
//!
//! # Example
//!
//! ```
//! use overlay_engine::{ConfigEngine, OverlaySource, Scope, config_interface};
//!
//! config_interface! {
//!     pub struct WorkerConfig {
//!         id: str("id"),
//!         quantum: int("scheduler.quantum") = "1",
//!     }
//! }
//!
//! let source: OverlaySource = serde_yaml::from_str(r#"
//! templates:
//!   worker:
//!     scheduler: { quantum: 5 }
//! "#).unwrap();
//!
//! let engine = ConfigEngine::new(source, Scope::Entity);
//! let worker = WorkerConfig::from_accessor(
//!     engine.resolve_and_bind("worker", WorkerConfig::descriptor()),
//! );
//!
//! assert_eq!(worker.id().unwrap(), "worker");
//! assert_eq!(worker.quantum().unwrap(), 5);
//! ```

pub mod binder;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod scope;
pub mod source;

pub use binder::Accessor;
pub use descriptor::{ConfigDescriptor, ConfigValue, KeySpec, ValueKind};
pub use engine::ConfigEngine;
pub use error::{Error, Result};
pub use resolver::resolve;
pub use scope::{Scope, ScopeCache, ScopeKey};
pub use source::{CONFIG_ENV_VAR, DEFAULT_FILE_NAME, EXTENDS_KEY, ID_KEY, OverlaySource};

// Re-exported for consumers and for the `config_interface!` expansion.
pub use overlay_tree::{FlatMap, SEPARATOR, expand, flatten};
