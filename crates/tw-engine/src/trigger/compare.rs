//! Key comparisons shared by `on_key` and the ordering conditions.

use std::cmp::Ordering;

use tw_core::{StateBag, Value};

/// What a key is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A literal value.
    Value(Value),
    /// The value stored under another key.
    Key(String),
}

/// An ordering relation for the `on_key_*` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Strictly greater.
    Gt,
    /// Strictly less.
    Lt,
    /// Greater or equal.
    Gte,
    /// Less or equal.
    Lte,
}

impl Relation {
    /// Does `ordering` (left compared to right) satisfy this relation?
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Gt => ordering == Ordering::Greater,
            Self::Lt => ordering == Ordering::Less,
            Self::Gte => ordering != Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Compare the values stored under two keys.
///
/// If either key is absent the result is [`Ordering::Less`], regardless of
/// which key is missing.
pub fn compare_keys(a: &str, b: &str, bag: &StateBag) -> Ordering {
    match (bag.get(a), bag.get(b)) {
        (Some(left), Some(right)) => left.compare(right),
        _ => Ordering::Less,
    }
}

/// Compare the value under `key` against a literal. A missing key reads
/// as `0`.
pub fn compare_with_value(key: &str, value: &Value, bag: &StateBag) -> Ordering {
    match bag.get(key) {
        Some(left) => left.coerced_cmp(value),
        None => Value::Int(0).coerced_cmp(value),
    }
}
