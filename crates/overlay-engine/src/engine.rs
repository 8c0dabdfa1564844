//! The configuration engine
//!
//! [`ConfigEngine`] ties the layers together behind the single consumer
//! entry point [`ConfigEngine::resolve_and_bind`]: snapshot the overlay
//! source, resolve the entity's merged tree, flatten it, bind it against a
//! descriptor and cache the bound accessor at the configured [`Scope`].
//!
//! The source snapshot lives behind an [`ArcSwap`]: a reload publishes a
//! fresh immutable [`OverlaySource`] atomically and clears the accessor
//! cache, while in-flight resolutions keep the snapshot they started with.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use overlay_tree::flatten;

use crate::binder::Accessor;
use crate::descriptor::ConfigDescriptor;
use crate::error::Result;
use crate::resolver;
use crate::scope::{Scope, ScopeCache, ScopeKey};
use crate::source::OverlaySource;

static NEXT_BINDER_ID: AtomicU64 = AtomicU64::new(0);

/// Resolution and binding engine over one overlay source.
///
/// The engine is passive and synchronous: every operation is an ordinary
/// blocking call, safe to invoke from many caller threads at once. The
/// accessor cache is its only mutable shared state.
pub struct ConfigEngine {
    source: ArcSwap<OverlaySource>,
    cache: ScopeCache,
    scope: Scope,
    /// Identity used for [`Scope::Binder`] cache keys.
    binder_id: u64,
    /// Path reloads re-read, when the engine was built from one.
    path: Option<PathBuf>,
}

impl ConfigEngine {
    /// Build an engine over an already-loaded source.
    pub fn new(source: OverlaySource, scope: Scope) -> Self {
        Self {
            source: ArcSwap::from_pointee(source),
            cache: ScopeCache::new(),
            scope,
            binder_id: NEXT_BINDER_ID.fetch_add(1, Ordering::Relaxed),
            path: None,
        }
    }

    /// Build an engine from a source file. A missing file is not an error:
    /// the engine starts over an empty source and resolves pure defaults.
    pub fn from_path(path: impl Into<PathBuf>, scope: Scope) -> Result<Self> {
        let path = path.into();
        let source = OverlaySource::load(&path)?;
        let mut engine = Self::new(source, scope);
        engine.path = Some(path);
        Ok(engine)
    }

    /// Build an engine from the default search path (environment override,
    /// working directory, platform config directory).
    pub fn from_default_path(scope: Scope) -> Result<Self> {
        Self::from_path(OverlaySource::find_default_path(), scope)
    }

    /// The configured sharing scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The current source snapshot.
    pub fn source(&self) -> Arc<OverlaySource> {
        self.source.load_full()
    }

    /// Resolve an entity's configuration and bind it against `descriptor`,
    /// returning the shared accessor for the configured scope.
    ///
    /// Under [`Scope::None`] every call constructs a fresh instance; under
    /// any other scope, concurrent first callers for the same key trigger
    /// exactly one resolve-and-bind.
    #[track_caller]
    pub fn resolve_and_bind(
        &self,
        entity_id: &str,
        descriptor: &'static ConfigDescriptor,
    ) -> Arc<Accessor> {
        let key = match self.scope {
            Scope::None => return self.build(entity_id, descriptor),
            Scope::Descriptor => ScopeKey::Descriptor(descriptor.name),
            Scope::CallSite => ScopeKey::CallSite(std::panic::Location::caller()),
            Scope::Binder => ScopeKey::Binder(self.binder_id),
            Scope::Entity => ScopeKey::Entity(entity_id.to_string()),
        };
        self.cache
            .get_or_create(key, || self.build(entity_id, descriptor))
    }

    /// Resolve an entity's merged configuration tree without binding.
    pub fn resolve_tree(&self, entity_id: &str) -> serde_json::Value {
        resolver::resolve(entity_id, &self.source.load())
    }

    fn build(&self, entity_id: &str, descriptor: &'static ConfigDescriptor) -> Arc<Accessor> {
        let snapshot = self.source.load();
        let tree = resolver::resolve(entity_id, &snapshot);
        Arc::new(Accessor::bind(flatten(&tree, &[]), descriptor))
    }

    /// Replace the source with a freshly loaded snapshot from `path` and
    /// drop all cached accessors.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let source = OverlaySource::load(path)?;
        self.replace_source(source);
        Ok(())
    }

    /// Reload from the path the engine was built from, or the default
    /// search path when it was built from an in-memory source.
    pub fn reload(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.reload_from(path),
            None => self.reload_from(&OverlaySource::find_default_path()),
        }
    }

    /// Atomically publish a new source snapshot and drop all cached
    /// accessors. In-flight resolutions keep their old snapshot.
    pub fn replace_source(&self, source: OverlaySource) {
        self.source.store(Arc::new(source));
        self.cache.clear();
        tracing::debug!("Overlay source replaced; accessor cache cleared");
    }

    /// Number of currently cached accessors.
    pub fn cached_accessors(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{KeySpec, ValueKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    static WORKER: ConfigDescriptor = ConfigDescriptor {
        name: "WorkerConfig",
        keys: &[
            KeySpec {
                key: "id",
                kind: ValueKind::Str,
                default: None,
            },
            KeySpec {
                key: "scheduler.quantum",
                kind: ValueKind::Int,
                default: Some("1"),
            },
        ],
    };

    fn sample_source() -> OverlaySource {
        serde_yaml::from_str(
            r#"
instances:
  - id: alpha
    extends: worker
templates:
  worker:
    scheduler:
      quantum: 5
defaults:
  scheduler:
    quantum: 1
"#,
        )
        .unwrap()
    }

    #[test]
    fn resolve_and_bind_exposes_merged_values() {
        let engine = ConfigEngine::new(sample_source(), Scope::Entity);
        let accessor = engine.resolve_and_bind("alpha", &WORKER);

        assert_eq!(accessor.get_str("id").unwrap(), "alpha");
        assert_eq!(accessor.get_int("scheduler.quantum").unwrap(), 5);
    }

    #[test]
    fn entity_scope_shares_one_instance_per_entity() {
        let engine = ConfigEngine::new(sample_source(), Scope::Entity);

        let first = engine.resolve_and_bind("alpha", &WORKER);
        let second = engine.resolve_and_bind("alpha", &WORKER);
        let other = engine.resolve_and_bind("beta", &WORKER);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(engine.cached_accessors(), 2);
    }

    #[test]
    fn none_scope_never_shares() {
        let engine = ConfigEngine::new(sample_source(), Scope::None);

        let first = engine.resolve_and_bind("alpha", &WORKER);
        let second = engine.resolve_and_bind("alpha", &WORKER);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_accessors(), 0);
    }

    #[test]
    fn binder_scope_keys_by_engine_identity() {
        let one = ConfigEngine::new(sample_source(), Scope::Binder);
        let two = ConfigEngine::new(sample_source(), Scope::Binder);

        assert_ne!(one.binder_id, two.binder_id);

        let first = one.resolve_and_bind("alpha", &WORKER);
        let again = one.resolve_and_bind("beta", &WORKER);
        // One shared instance per binder, whatever the entity.
        assert!(Arc::ptr_eq(&first, &again));

        let elsewhere = two.resolve_and_bind("alpha", &WORKER);
        assert!(!Arc::ptr_eq(&first, &elsewhere));
    }

    #[test]
    fn descriptor_scope_shares_one_instance_per_shape() {
        let engine = ConfigEngine::new(sample_source(), Scope::Descriptor);

        let first = engine.resolve_and_bind("alpha", &WORKER);
        let second = engine.resolve_and_bind("beta", &WORKER);

        // Keyed by the descriptor type, not the entity.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_accessors(), 1);
    }

    #[test]
    fn call_site_scope_keys_by_location() {
        let engine = ConfigEngine::new(sample_source(), Scope::CallSite);

        let mut from_loop = Vec::new();
        for _ in 0..2 {
            from_loop.push(engine.resolve_and_bind("alpha", &WORKER));
        }
        // Same call site, same instance.
        assert!(Arc::ptr_eq(&from_loop[0], &from_loop[1]));

        // A different call site gets its own instance.
        let elsewhere = engine.resolve_and_bind("alpha", &WORKER);
        assert!(!Arc::ptr_eq(&from_loop[0], &elsewhere));
    }

    #[test]
    fn replace_source_invalidates_cached_accessors() {
        let engine = ConfigEngine::new(sample_source(), Scope::Entity);
        let before = engine.resolve_and_bind("alpha", &WORKER);
        assert_eq!(before.get_int("scheduler.quantum").unwrap(), 5);

        let updated: OverlaySource = serde_yaml::from_str(
            "templates:\n  worker:\n    scheduler:\n      quantum: 9\ninstances:\n  - id: alpha\n    extends: worker\n",
        )
        .unwrap();
        engine.replace_source(updated);

        let after = engine.resolve_and_bind("alpha", &WORKER);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.get_int("scheduler.quantum").unwrap(), 9);
        // The pre-reload accessor keeps serving its old snapshot.
        assert_eq!(before.get_int("scheduler.quantum").unwrap(), 5);
    }

    #[test]
    fn resolve_tree_returns_the_merged_tree() {
        let engine = ConfigEngine::new(sample_source(), Scope::Entity);
        assert_eq!(
            engine.resolve_tree("alpha"),
            json!({"id": "alpha", "scheduler": {"quantum": 5}})
        );
    }

    #[test]
    fn from_path_with_missing_file_resolves_pure_defaults() {
        let engine =
            ConfigEngine::from_path("/nonexistent/overlay.yaml", Scope::Entity).unwrap();
        assert_eq!(engine.resolve_tree("ghost"), json!({"id": "ghost"}));
    }
}
