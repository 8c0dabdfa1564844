//! End-to-end engine tests: source file -> resolution -> typed accessors.

use std::io::Write;
use std::sync::Arc;
use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use overlay_engine::{
    ConfigEngine, Error, FlatMap, OverlaySource, Scope, ScopeCache, ScopeKey, config_interface,
};

config_interface! {
    /// Top-level shape of a resolved agent entity.
    pub struct AgentConfig {
        id: str("id"),
        quantum: int("scheduler.quantum") = "1",
        policy: str("scheduler.policy") = "rr",
        persist: bool("state.persist") = "false",
        port: int("transport.port"),
    }
}

config_interface! {
    /// Narrowed scheduler section.
    pub struct SchedulerConfig {
        quantum: int("quantum") = "1",
        policy: str("policy") = "rr",
    }
}

const SOURCE: &str = r#"
instances:
  - id: alpha
    extends: worker
    scheduler:
      quantum: 10
  - id: solo
    transport:
      port: 7000
templates:
  worker:
    scheduler:
      quantum: 5
      policy: fifo
    state:
      persist: true
defaults:
  transport:
    port: 9400
"#;

fn engine(scope: Scope) -> ConfigEngine {
    let source: OverlaySource = serde_yaml::from_str(SOURCE).unwrap();
    ConfigEngine::new(source, scope)
}

#[test]
fn file_to_typed_accessor_pipeline() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    write!(file, "{SOURCE}").unwrap();

    let engine = ConfigEngine::from_path(file.path(), Scope::Entity).unwrap();
    let alpha = AgentConfig::from_accessor(
        engine.resolve_and_bind("alpha", AgentConfig::descriptor()),
    );

    assert_eq!(alpha.id().unwrap(), "alpha");
    assert_eq!(alpha.quantum().unwrap(), 10); // instance wins
    assert_eq!(alpha.policy().unwrap(), "fifo"); // template fills in
    assert!(alpha.persist().unwrap()); // template fills in
    assert_eq!(alpha.port().unwrap(), 9400); // defaults fill in
}

#[test]
fn instance_without_extends_merges_defaults_only() {
    let engine = engine(Scope::Entity);
    let solo = AgentConfig::from_accessor(
        engine.resolve_and_bind("solo", AgentConfig::descriptor()),
    );

    assert_eq!(solo.port().unwrap(), 7000); // instance wins over defaults
    assert_eq!(solo.quantum().unwrap(), 1); // declared default applies
    assert!(!solo.persist().unwrap());
}

#[test]
fn template_as_entity_and_pure_defaults_fallbacks() {
    let engine = engine(Scope::Entity);

    let worker = AgentConfig::from_accessor(
        engine.resolve_and_bind("worker", AgentConfig::descriptor()),
    );
    assert_eq!(worker.id().unwrap(), "worker");
    assert_eq!(worker.quantum().unwrap(), 5);
    assert_eq!(worker.port().unwrap(), 9400);

    let ghost = AgentConfig::from_accessor(
        engine.resolve_and_bind("ghost", AgentConfig::descriptor()),
    );
    assert_eq!(ghost.id().unwrap(), "ghost");
    assert_eq!(ghost.port().unwrap(), 9400);
    assert_eq!(ghost.quantum().unwrap(), 1);
}

#[test]
fn narrowed_sub_configuration_binds_against_nested_shape() {
    let engine = engine(Scope::Entity);
    let alpha = engine.resolve_and_bind("alpha", AgentConfig::descriptor());

    let scheduler = SchedulerConfig::from_accessor(
        alpha.narrow_shared("scheduler", SchedulerConfig::descriptor()),
    );
    assert_eq!(scheduler.quantum().unwrap(), 10);
    assert_eq!(scheduler.policy().unwrap(), "fifo");
}

#[test]
fn missing_required_key_surfaces_missing_value() {
    let source: OverlaySource = serde_yaml::from_str("defaults: {}").unwrap();
    let engine = ConfigEngine::new(source, Scope::Entity);
    let ghost = AgentConfig::from_accessor(
        engine.resolve_and_bind("ghost", AgentConfig::descriptor()),
    );

    // `transport.port` has no declared default and no source value.
    match ghost.port().unwrap_err() {
        Error::MissingValue { key, descriptor } => {
            assert_eq!(key, "transport.port");
            assert_eq!(descriptor, "AgentConfig");
        }
        other => panic!("expected MissingValue, got {other:?}"),
    }
}

#[test]
fn concurrent_resolve_and_bind_is_single_flight() {
    const CALLERS: usize = 12;

    let engine = engine(Scope::Entity);
    let barrier = Barrier::new(CALLERS);

    let accessors: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    engine.resolve_and_bind("alpha", AgentConfig::descriptor())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for accessor in &accessors[1..] {
        assert!(Arc::ptr_eq(&accessors[0], accessor));
    }
    assert_eq!(engine.cached_accessors(), 1);
}

#[test]
fn scope_cache_builder_runs_once_under_contention() {
    const CALLERS: usize = 12;

    let cache = ScopeCache::new();
    let builds = AtomicUsize::new(0);
    let barrier = Barrier::new(CALLERS);

    std::thread::scope(|scope| {
        for _ in 0..CALLERS {
            scope.spawn(|| {
                barrier.wait();
                cache.get_or_create(ScopeKey::Entity("alpha".into()), || {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Arc::new(overlay_engine::Accessor::bind(
                        FlatMap::new(),
                        AgentConfig::descriptor(),
                    ))
                });
            });
        }
    });

    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn none_scope_yields_fresh_instances() {
    let engine = engine(Scope::None);

    let first = engine.resolve_and_bind("alpha", AgentConfig::descriptor());
    let second = engine.resolve_and_bind("alpha", AgentConfig::descriptor());

    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn reload_from_publishes_new_snapshot() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    write!(file, "{SOURCE}").unwrap();

    let engine = ConfigEngine::from_path(file.path(), Scope::Entity).unwrap();
    let before = AgentConfig::from_accessor(
        engine.resolve_and_bind("alpha", AgentConfig::descriptor()),
    );
    assert_eq!(before.quantum().unwrap(), 10);

    let mut updated = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    write!(
        updated,
        "instances:\n  - id: alpha\n    scheduler:\n      quantum: 99\n"
    )
    .unwrap();
    engine.reload_from(updated.path()).unwrap();

    let after = AgentConfig::from_accessor(
        engine.resolve_and_bind("alpha", AgentConfig::descriptor()),
    );
    assert_eq!(after.quantum().unwrap(), 99);
    // The accessor bound before the reload keeps its snapshot.
    assert_eq!(before.quantum().unwrap(), 10);
}
