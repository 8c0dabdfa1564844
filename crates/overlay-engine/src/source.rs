//! Overlay source documents
//!
//! An [`OverlaySource`] is an immutable snapshot of the three named override
//! layers, deserialized from a single YAML or JSON document:
//!
//! ```yaml
//! instances:              # per-entity override trees, each with an `id`
//!   - id: alpha
//!     extends: worker     # optional template reference
//!     scheduler: { quantum: 10 }
//! templates:              # name -> override tree
//!   worker:
//!     scheduler: { quantum: 5, policy: fifo }
//! defaults:               # global defaults tree
//!   scheduler: { quantum: 1, policy: rr, preemptive: false }
//! ```
//!
//! Sources are loaded once and never mutated; a reload builds a fresh
//! snapshot and publishes it atomically (see [`crate::ConfigEngine`]).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Field naming the entity an instance entry belongs to.
pub const ID_KEY: &str = "id";

/// Field referencing the template an instance entry borrows from.
pub const EXTENDS_KEY: &str = "extends";

/// Environment variable overriding the default source path.
pub const CONFIG_ENV_VAR: &str = "OVERLAY_CONFIG";

/// Default source file name searched in the working directory and the
/// platform config directory.
pub const DEFAULT_FILE_NAME: &str = "overlay.yaml";

/// Immutable snapshot of the instance/template/defaults override layers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlaySource {
    /// Per-entity override trees; each entry carries an `id` field.
    #[serde(default)]
    pub instances: Vec<Value>,

    /// Named template trees referenced through `extends` or used directly
    /// when no instance matches an entity id.
    #[serde(default)]
    pub templates: BTreeMap<String, Value>,

    /// Global defaults tree applied to every entity.
    #[serde(default)]
    pub defaults: Value,
}

impl OverlaySource {
    /// An empty source: resolution over it yields pure defaults, which are
    /// themselves empty apart from the injected entity id.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a source document from a file.
    ///
    /// The format is chosen by extension: `.json` parses as JSON, anything
    /// else as YAML. A missing or unreadable file is not an error: it is
    /// logged at debug level and an empty source is returned, so resolution
    /// falls back to pure defaults. A present but malformed document is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(reason) => {
                tracing::debug!(?path, %reason, "Overlay source unavailable; using empty source");
                return Ok(Self::empty());
            }
        };
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Determine the default source path.
    ///
    /// Checked in order: the `OVERLAY_CONFIG` environment variable, then
    /// `overlay.yaml` in the working directory, then the platform config
    /// directory (`<config_dir>/overlay/overlay.yaml`). The returned path
    /// may not exist; [`OverlaySource::load`] treats that as an empty
    /// source.
    pub fn find_default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        let local = PathBuf::from(DEFAULT_FILE_NAME);
        if local.is_file() {
            return local;
        }
        dirs::config_dir()
            .map(|dir| dir.join("overlay").join(DEFAULT_FILE_NAME))
            .unwrap_or(local)
    }

    /// Find the instance entry whose `id` field equals `entity_id`.
    pub fn instance_for(&self, entity_id: &str) -> Option<&Value> {
        self.instances
            .iter()
            .find(|entry| entry.get(ID_KEY).and_then(Value::as_str) == Some(entity_id))
    }

    /// Look up a template by name.
    pub fn template(&self, name: &str) -> Option<&Value> {
        self.templates.get(name)
    }

    /// The defaults tree specialized for one entity: a clone of the global
    /// defaults with the entity id injected under [`ID_KEY`].
    pub fn defaults_for(&self, entity_id: &str) -> Value {
        let mut tree = match &self.defaults {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        tree.insert(ID_KEY.to_string(), Value::String(entity_id.to_string()));
        Value::Object(tree)
    }

    /// Ids of all declared instance entries, in document order.
    pub fn instance_ids(&self) -> Vec<&str> {
        self.instances
            .iter()
            .filter_map(|entry| entry.get(ID_KEY).and_then(Value::as_str))
            .collect()
    }

    /// Names of all declared templates, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}
