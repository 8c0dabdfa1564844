//! Error types for overlay-engine

/// Result type for overlay-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in overlay-engine operations
///
/// Only access-time and explicit-load failures surface as errors. A missing
/// or unreadable source file and a dangling `extends` reference degrade
/// gracefully during resolution (logged, resolution continues with the
/// remaining layers).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No value found for a key in the override chain, the instance cache or
    /// the declared defaults
    #[error("No value for key '{key}' in {descriptor} configuration")]
    MissingValue {
        key: String,
        descriptor: &'static str,
    },

    /// A present value could not be converted to the key's declared type
    #[error("Cannot convert '{raw}' to {target} for key '{key}'")]
    Conversion {
        key: String,
        raw: String,
        target: &'static str,
    },

    /// A key was requested that the descriptor does not declare
    #[error("Key '{key}' is not declared by {descriptor}")]
    UndeclaredKey {
        key: String,
        descriptor: &'static str,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
