//! Tagged-variant configuration values.
//!
//! Name-based lookup returns a type-safe [`Value`] instead of a
//! polymorphic object probed at runtime. Each entry carries a revision
//! counter bumped on every write, so readers can cache a value and cheaply
//! detect changes without a callback registration.

use std::collections::HashMap;
use std::sync::RwLock;

/// A configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    revision: u64,
}

/// Named, watchable configuration values shared across the engine.
///
/// Thread-safe; the evaluation thread and the embedding application read
/// and write concurrently.
#[derive(Debug, Default)]
pub struct ValueStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value if the path is still unset. Existing entries win,
    /// so configuration loaded before a component initializes is kept.
    pub fn register(&self, path: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(path.to_string())
            .or_insert(Entry { value, revision: 0 });
    }

    /// Writes a value, creating the path if needed and bumping its
    /// revision.
    pub fn set(&self, path: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(path.to_string()).or_insert(Entry {
            value: value.clone(),
            revision: 0,
        });
        entry.value = value;
        entry.revision += 1;
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).map(|e| e.value.clone())
    }

    /// Current revision of a path, or `None` if unregistered. Bumped on
    /// every write.
    pub fn revision(&self, path: &str) -> Option<u64> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).map(|e| e.revision)
    }

    pub fn contains(&self, path: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(path)
    }

    pub fn set_int(&self, path: &str, value: i64) {
        self.set(path, Value::Int(value));
    }

    pub fn set_double(&self, path: &str, value: f64) {
        self.set(path, Value::Double(value));
    }

    pub fn set_bool(&self, path: &str, value: bool) {
        self.set(path, Value::Bool(value));
    }

    pub fn set_text(&self, path: &str, value: impl Into<String>) {
        self.set(path, Value::Text(value.into()));
    }

    pub fn get_int(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_int()
    }

    pub fn get_double(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_double()
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    pub fn get_text(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_typed() {
        let store = ValueStore::new();
        store.set_int("/a", 7);
        store.set_bool("/b", true);
        store.set_text("/c", "dir");
        store.set_double("/d", 0.25);

        assert_eq!(store.get_int("/a"), Some(7));
        assert_eq!(store.get_bool("/b"), Some(true));
        assert_eq!(store.get_text("/c"), Some("dir".to_string()));
        assert_eq!(store.get_double("/d"), Some(0.25));
    }

    #[test]
    fn test_wrong_variant_reads_none() {
        let store = ValueStore::new();
        store.set_int("/a", 7);
        assert_eq!(store.get_bool("/a"), None);
        assert_eq!(store.get_text("/a"), None);
        // Int widens to double by design.
        assert_eq!(store.get_double("/a"), Some(7.0));
    }

    #[test]
    fn test_register_does_not_overwrite() {
        let store = ValueStore::new();
        store.set_int("/a", 7);
        store.register("/a", Value::Int(99));
        assert_eq!(store.get_int("/a"), Some(7));

        store.register("/b", Value::Int(1));
        assert_eq!(store.get_int("/b"), Some(1));
    }

    #[test]
    fn test_revision_bumps_on_write() {
        let store = ValueStore::new();
        assert_eq!(store.revision("/a"), None);

        store.register("/a", Value::Int(0));
        let r0 = store.revision("/a").unwrap();
        store.set_int("/a", 1);
        store.set_int("/a", 2);
        assert!(store.revision("/a").unwrap() > r0);
    }
}
