//! Tree/flat-map codec for Overlay Manager
//!
//! This crate converts between nested tree-structured values (the shape of a
//! parsed YAML or JSON document) and flat, dotted-key property maps:
//!
//! - [`flatten`] walks a `serde_json::Value` and writes one `path = scalar`
//!   entry per leaf, joining path segments with `.` and using positional
//!   indices for array elements.
//! - [`expand`] rebuilds the tree from a [`FlatMap`], coercing scalar text
//!   back into numbers/booleans/null and detecting arrays by their
//!   contiguous zero-based integer keys.
//!
//! The crate is Layer 0: pure functions over in-memory values, no I/O and no
//! internal dependencies. Higher layers merge flat maps from several sources
//! and bind the result to typed accessors.
//!
//! # Example
//!
//! ```
//! use overlay_tree::{flatten, expand};
//! use serde_json::json;
//!
//! let tree = json!({"transport": {"hosts": ["a", "b"], "port": 9400}});
//! let flat = flatten(&tree, &[]);
//!
//! assert_eq!(flat.get("transport.hosts.0"), Some("a"));
//! assert_eq!(flat.get("transport.port"), Some("9400"));
//! assert_eq!(expand(&flat, &[]), tree);
//! ```

pub mod codec;
pub mod flat;

pub use codec::{expand, flatten};
pub use flat::{FlatMap, SEPARATOR};
