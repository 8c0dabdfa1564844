//! Typed accessor binding
//!
//! An [`Accessor`] binds a flat property map to a [`ConfigDescriptor`] and
//! answers typed lookups through the resolution chain of the engine:
//! present value, then memoized value, then declared default, then a
//! [`Error::MissingValue`] failure. Converted values are memoized
//! write-once per key for the life of the instance.
//!
//! The [`config_interface!`](crate::config_interface) macro generates the
//! typed boilerplate on top: a static descriptor plus one method per
//! declared key.

use std::sync::Arc;

use dashmap::DashMap;

use overlay_tree::FlatMap;

use crate::descriptor::{ConfigDescriptor, ConfigValue, KeySpec};
use crate::error::{Error, Result};

/// A bound configuration accessor: one flat map, one descriptor, one
/// private memo cache.
///
/// Binding is infallible; conversion happens lazily on first access to each
/// key and the converted value is cached, never recomputed and never
/// invalidated while the instance lives.
#[derive(Debug)]
pub struct Accessor {
    descriptor: &'static ConfigDescriptor,
    values: FlatMap,
    cache: DashMap<&'static str, ConfigValue>,
}

impl Accessor {
    /// Bind a flat property map against a descriptor.
    pub fn bind(values: FlatMap, descriptor: &'static ConfigDescriptor) -> Self {
        Self {
            descriptor,
            values,
            cache: DashMap::new(),
        }
    }

    /// The descriptor this accessor is bound against.
    pub fn descriptor(&self) -> &'static ConfigDescriptor {
        self.descriptor
    }

    /// The bound flat map (read-only).
    pub fn values(&self) -> &FlatMap {
        &self.values
    }

    /// Resolve a declared key through the chain: bound value, memoized
    /// value, declared default; fail with [`Error::MissingValue`] when all
    /// three come up empty.
    pub fn get(&self, key: &str) -> Result<ConfigValue> {
        let spec = self
            .descriptor
            .spec_for(key)
            .ok_or_else(|| Error::UndeclaredKey {
                key: key.to_string(),
                descriptor: self.descriptor.name,
            })?;

        if let Some(cached) = self.cache.get(spec.key) {
            return Ok(cached.value().clone());
        }
        if let Some(raw) = self.values.get(spec.key) {
            return self.convert_and_memoize(spec, raw);
        }
        if let Some(raw) = spec.default {
            return self.convert_and_memoize(spec, raw);
        }
        Err(Error::MissingValue {
            key: key.to_string(),
            descriptor: self.descriptor.name,
        })
    }

    fn convert_and_memoize(&self, spec: &'static KeySpec, raw: &str) -> Result<ConfigValue> {
        let converted = spec
            .kind
            .convert(raw)
            .ok_or_else(|| self.descriptor.conversion_error(spec.key, raw, spec.kind))?;
        // Write-once: a concurrent first access stores the identical value.
        self.cache.entry(spec.key).or_insert_with(|| converted.clone());
        Ok(converted)
    }

    /// Typed lookup for a `bool`-declared key.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        value
            .as_bool()
            .ok_or_else(|| self.kind_mismatch(key, &value, "bool"))
    }

    /// Typed lookup for an integer-declared key.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        value
            .as_int()
            .ok_or_else(|| self.kind_mismatch(key, &value, "integer"))
    }

    /// Typed lookup for a float-declared key; integer values widen.
    pub fn get_float(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?;
        value
            .as_float()
            .ok_or_else(|| self.kind_mismatch(key, &value, "float"))
    }

    /// Typed lookup for a string-declared key.
    pub fn get_str(&self, key: &str) -> Result<String> {
        let value = self.get(key)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.kind_mismatch(key, &value, "string"))
    }

    fn kind_mismatch(&self, key: &str, value: &ConfigValue, target: &'static str) -> Error {
        Error::Conversion {
            key: key.to_string(),
            raw: format!("{value:?}"),
            target,
        }
    }

    /// Bind the sub-configuration under `prefix` against a nested
    /// descriptor: the keys under `prefix + "."` are narrowed out, prefix
    /// stripped, and bound fresh. The child shares no cache with its
    /// parent.
    pub fn narrow(&self, prefix: &str, descriptor: &'static ConfigDescriptor) -> Accessor {
        Accessor::bind(self.values.narrow(prefix), descriptor)
    }

    /// Like [`Accessor::narrow`] but shared, for handing out to consumers.
    pub fn narrow_shared(
        &self,
        prefix: &str,
        descriptor: &'static ConfigDescriptor,
    ) -> Arc<Accessor> {
        Arc::new(self.narrow(prefix, descriptor))
    }
}

/// Declare a typed configuration interface: a struct with one method per
/// declared key, backed by a shared [`Accessor`] and a static
/// [`ConfigDescriptor`].
///
/// Key kinds are `bool`, `int` (`i64`), `float` (`f64`) and `str`
/// (`String`); a trailing `= "literal"` declares the key's default in raw
/// string form.
///
/// # Example
///
/// ```
/// use overlay_engine::{FlatMap, config_interface};
///
/// config_interface! {
///     /// Scheduler section of an entity's resolved configuration.
///     pub struct SchedulerConfig {
///         /// Scheduling quantum in milliseconds.
///         quantum_ms: float("quantum-ms") = "5.0",
///         policy: str("policy") = "fifo",
///         preemptive: bool("preemptive"),
///     }
/// }
///
/// let mut flat = FlatMap::new();
/// flat.insert("preemptive", "true");
///
/// let scheduler = SchedulerConfig::bind(flat);
/// assert_eq!(scheduler.quantum_ms().unwrap(), 5.0);
/// assert!(scheduler.preemptive().unwrap());
/// ```
#[macro_export]
macro_rules! config_interface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$key_meta:meta])*
                $method:ident : $kind:ident ($key:literal) $(= $default:literal)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            inner: ::std::sync::Arc<$crate::Accessor>,
        }

        impl $name {
            /// The static key table for this configuration shape.
            pub fn descriptor() -> &'static $crate::ConfigDescriptor {
                static DESCRIPTOR: $crate::ConfigDescriptor = $crate::ConfigDescriptor {
                    name: stringify!($name),
                    keys: &[
                        $(
                            $crate::KeySpec {
                                key: $key,
                                kind: $crate::config_interface!(@kind $kind),
                                default: $crate::config_interface!(@default $($default)?),
                            },
                        )+
                    ],
                };
                &DESCRIPTOR
            }

            /// Bind a flat property map against this shape.
            pub fn bind(values: $crate::FlatMap) -> Self {
                Self::from_accessor(::std::sync::Arc::new($crate::Accessor::bind(
                    values,
                    Self::descriptor(),
                )))
            }

            /// Wrap an accessor already bound against this shape.
            pub fn from_accessor(inner: ::std::sync::Arc<$crate::Accessor>) -> Self {
                Self { inner }
            }

            /// The underlying shared accessor.
            pub fn accessor(&self) -> &::std::sync::Arc<$crate::Accessor> {
                &self.inner
            }

            $(
                $(#[$key_meta])*
                pub fn $method(&self) -> $crate::Result<$crate::config_interface!(@ty $kind)> {
                    $crate::config_interface!(@call self.inner, $kind, $key)
                }
            )+
        }
    };
    (@kind bool) => { $crate::ValueKind::Bool };
    (@kind int) => { $crate::ValueKind::Int };
    (@kind float) => { $crate::ValueKind::Float };
    (@kind str) => { $crate::ValueKind::Str };
    (@ty bool) => { bool };
    (@ty int) => { i64 };
    (@ty float) => { f64 };
    (@ty str) => { ::std::string::String };
    (@default) => { ::std::option::Option::None };
    (@default $default:literal) => { ::std::option::Option::Some($default) };
    (@call $inner:expr, bool, $key:literal) => { $inner.get_bool($key) };
    (@call $inner:expr, int, $key:literal) => { $inner.get_int($key) };
    (@call $inner:expr, float, $key:literal) => { $inner.get_float($key) };
    (@call $inner:expr, str, $key:literal) => { $inner.get_str($key) };
}
