//! Flat dotted-key property maps
//!
//! A [`FlatMap`] is the flattened form of a configuration tree: an ordered
//! mapping from dotted-path key (segments joined by [`SEPARATOR`]) to a
//! scalar string value. Iteration order is insertion order, so a map built
//! by flattening preserves the discovery order of the source tree.

/// Separator between path segments in a flattened key.
pub const SEPARATOR: char = '.';

/// An insertion-ordered map from dotted-path key to scalar string value.
///
/// Invariants expected of well-formed maps (maintained by the codec, not
/// enforced here):
///
/// - every key maps to exactly one scalar;
/// - no key is a strict prefix of another except through the
///   separator-delimited hierarchy (`"a"` and `"a.b"` never coexist).
///
/// # Example
///
/// ```
/// use overlay_tree::FlatMap;
///
/// let mut flat = FlatMap::new();
/// flat.insert("scheduler.quantum", "5");
/// flat.insert("scheduler.policy", "fifo");
///
/// assert_eq!(flat.get("scheduler.policy"), Some("fifo"));
/// let narrowed = flat.narrow("scheduler");
/// assert_eq!(narrowed.get("quantum"), Some("5"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatMap {
    entries: Vec<(String, String)>,
}

impl FlatMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair.
    ///
    /// Replaces the value in place when the key is already present, keeping
    /// the key's original position in the iteration order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a narrowed view: the entries whose keys live under
    /// `prefix + SEPARATOR`, with the prefix stripped, preserving order.
    ///
    /// A key exactly equal to `prefix` becomes the empty key `""` (a bare
    /// scalar at the prefix root). An empty prefix clones the whole map.
    pub fn narrow(&self, prefix: &str) -> FlatMap {
        if prefix.is_empty() {
            return self.clone();
        }
        let mut narrowed = FlatMap::new();
        for (key, value) in self.iter() {
            if key == prefix {
                narrowed.insert("", value);
            } else if let Some(rest) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(SEPARATOR))
            {
                narrowed.insert(rest, value);
            }
        }
        narrowed
    }
}

impl FromIterator<(String, String)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut flat = FlatMap::new();
        for (key, value) in iter {
            flat.insert(key, value);
        }
        flat
    }
}

impl IntoIterator for FlatMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
