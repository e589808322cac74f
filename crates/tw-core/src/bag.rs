use std::collections::HashMap;

use crate::value::Value;

/// The flat key-value store holding every game variable.
///
/// One bag lives for a whole play session. The engine mutates it in place
/// and never copies it; observers that need a frozen view call
/// [`StateBag::snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateBag {
    values: HashMap<String, Value>,
}

impl StateBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Read `key` as an integer; absent or non-numeric values read as `0`.
    pub fn int_or_zero(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_int).unwrap_or(0)
    }

    /// Number of keys in the bag.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the bag holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take an independent copy for read-only observers.
    pub fn snapshot(&self) -> StateBag {
        self.clone()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StateBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
