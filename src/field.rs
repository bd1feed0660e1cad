/// Optional numeric metadata. A field is either a concrete value or one of three states that say
/// why there is no value.
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldValue<T> {
    /// Not resolved yet. Statistics in this state are fetched on first read.
    #[default]
    Undetermined,
    /// Resolved, but the source does not provide it.
    Unavailable,
    /// Meaningless for this record, e.g. the length of a radio stream.
    Irrelevant,
    Value(T),
}

impl<T: Copy> FieldValue<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            FieldValue::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, FieldValue::Undetermined)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, FieldValue::Value(_))
    }

    /// Moves to `next` unless that would send a resolved field back to `Undetermined`, which only a
    /// full record reset may do. Returns whether the transition happened.
    pub fn transition(&mut self, next: FieldValue<T>) -> bool {
        if next.is_undetermined() && !self.is_undetermined() {
            return false;
        }
        *self = next;
        true
    }
}

impl<T: Copy + Default> FieldValue<T> {
    pub fn value_or_default(&self) -> T {
        self.value().unwrap_or_default()
    }
}

impl<T> From<T> for FieldValue<T> {
    fn from(v: T) -> Self {
        FieldValue::Value(v)
    }
}

impl<T> FieldValue<T> {
    /// A resolved lookup: `None` means the source has nothing for this field.
    pub fn resolved(v: Option<T>) -> Self {
        match v {
            Some(v) => FieldValue::Value(v),
            None => FieldValue::Unavailable,
        }
    }
}

impl<T: Copy + Display> FieldValue<T> {
    /// Machine-readable form used in persisted playlists: the bare number, or empty when there is
    /// no value.
    pub fn exact_text(&self) -> String {
        self.value().map(|v| v.to_string()).unwrap_or_default()
    }
}

/// Parses an exact-text number. Unparseable input reads as zero.
pub fn parse_exact<T: FromStr + Default>(s: &str) -> T {
    s.trim().parse().unwrap_or_default()
}
