//! Accessor sharing scopes and the scope cache
//!
//! A [`Scope`] picks the granularity at which bound accessors are shared:
//! per descriptor type, per call site, per binder (engine), per entity id,
//! or not at all. The [`ScopeCache`] is the only mutable shared state in
//! the engine: a striped-lock map with an at-most-once-per-key construction
//! guarantee, owned explicitly by the engine rather than hidden in a
//! process-wide singleton.

use std::panic::Location;
use std::sync::Arc;

use dashmap::DashMap;

use crate::binder::Accessor;

/// Sharing granularity for bound accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// One shared instance per descriptor type.
    Descriptor,
    /// One shared instance per `resolve_and_bind` call site.
    CallSite,
    /// One shared instance per binder (engine) identity.
    Binder,
    /// One shared instance per entity id.
    #[default]
    Entity,
    /// No sharing: every call constructs a fresh instance.
    None,
}

/// Concrete cache key under a given scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    Descriptor(&'static str),
    CallSite(&'static Location<'static>),
    Binder(u64),
    Entity(String),
}

/// Cache of bound accessor instances, keyed by [`ScopeKey`].
///
/// Entries live until explicitly invalidated or the cache is cleared (the
/// engine clears it on reload). Concurrent `get_or_create` calls for one
/// unseen key run the builder exactly once; all callers receive the same
/// instance.
#[derive(Debug, Default)]
pub struct ScopeCache {
    map: DashMap<ScopeKey, Arc<Accessor>>,
}

impl ScopeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached instance for `key`, or build, store and return a
    /// new one. The builder runs at most once per key: the per-shard entry
    /// lock is held across the builder call, so racing callers observe
    /// exactly one constructed instance.
    pub fn get_or_create(
        &self,
        key: ScopeKey,
        build: impl FnOnce() -> Arc<Accessor>,
    ) -> Arc<Accessor> {
        self.map.entry(key).or_insert_with(build).value().clone()
    }

    /// Look up a cached instance without creating one.
    pub fn get(&self, key: &ScopeKey) -> Option<Arc<Accessor>> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    /// Drop one entry, returning it if it was present.
    pub fn invalidate(&self, key: &ScopeKey) -> Option<Arc<Accessor>> {
        self.map.remove(key).map(|(_, instance)| instance)
    }

    /// Drop all entries (used on source reload and binder teardown).
    pub fn clear(&self) {
        self.map.clear();
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
