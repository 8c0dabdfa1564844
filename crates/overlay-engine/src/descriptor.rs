//! Static configuration shape metadata
//!
//! A [`ConfigDescriptor`] is the compile-time table behind one configuration
//! "shape": the declared keys, each key's target type and its optional
//! declared default. Descriptors are plain `static` data built by the
//! [`config_interface!`](crate::config_interface) macro, shared by
//! reference and never mutated.

use crate::error::Error;

/// Target type of a declared configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueKind {
    /// Human-readable target type name used in conversion errors.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
        }
    }

    /// Convert raw scalar text into a typed value.
    ///
    /// Booleans accept exactly `true`/`false`; integers parse as `i64`;
    /// floats parse as `f64` (so plain integer text converts too); strings
    /// always succeed.
    pub fn convert(self, raw: &str) -> Option<ConfigValue> {
        match self {
            ValueKind::Bool => match raw {
                "true" => Some(ConfigValue::Bool(true)),
                "false" => Some(ConfigValue::Bool(false)),
                _ => None,
            },
            ValueKind::Int => raw.parse::<i64>().ok().map(ConfigValue::Int),
            ValueKind::Float => raw.parse::<f64>().ok().map(ConfigValue::Float),
            ValueKind::Str => Some(ConfigValue::Str(raw.to_string())),
        }
    }
}

/// A converted, typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view: floats as-is, integers widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(value) => Some(*value),
            ConfigValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(text) => Some(text),
            _ => None,
        }
    }
}

/// One declared key: name, target type, optional default (kept in raw
/// string form and converted lazily, exactly like a present value).
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    pub key: &'static str,
    pub kind: ValueKind,
    pub default: Option<&'static str>,
}

/// Immutable metadata for one configuration shape.
#[derive(Debug)]
pub struct ConfigDescriptor {
    /// Shape name, used in error messages and descriptor-scoped cache keys.
    pub name: &'static str,
    pub keys: &'static [KeySpec],
}

impl ConfigDescriptor {
    /// Iterate the declared key names.
    pub fn declared_keys(&self) -> impl Iterator<Item = &'static str> {
        self.keys.iter().map(|spec| spec.key)
    }

    /// Look up the spec for a key.
    pub fn spec_for(&self, key: &str) -> Option<&'static KeySpec> {
        self.keys.iter().find(|spec| spec.key == key)
    }

    /// Declared default for a key, if any.
    pub fn default_for(&self, key: &str) -> Option<&'static str> {
        self.spec_for(key).and_then(|spec| spec.default)
    }

    /// Declared target type for a key, if declared at all.
    pub fn kind_for(&self, key: &str) -> Option<ValueKind> {
        self.spec_for(key).map(|spec| spec.kind)
    }

    /// Build the conversion error for a raw value that failed to convert.
    pub(crate) fn conversion_error(&self, key: &str, raw: &str, kind: ValueKind) -> Error {
        Error::Conversion {
            key: key.to_string(),
            raw: raw.to_string(),
            target: kind.name(),
        }
    }
}
