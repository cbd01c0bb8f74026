//! Label sets and their canonical group identity.
//!
//! A [`LabelSet`] is the caller-supplied metadata attached to every
//! observation (e.g. `{method: "GET", status: 200}`). Identity is defined by
//! content, never by insertion order: the set is kept with keys sorted, the
//! canonical form is the sorted-key JSON serialization, and the
//! [`GroupKey`] is the SHA-256 digest of those bytes. Two label sets with
//! the same key/value pairs always produce the same group key.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Label values
// ---------------------------------------------------------------------------

/// A scalar label value: string, integer, float, or bool.
///
/// Serializes untagged, so the canonical JSON carries the plain scalar
/// (`"GET"`, `200`, `1.5`, `true`) rather than an enum wrapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Str(s) => f.write_str(s),
            LabelValue::Bool(b) => write!(f, "{b}"),
            LabelValue::Int(i) => write!(f, "{i}"),
            LabelValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(s: &str) -> Self {
        LabelValue::Str(s.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(s: String) -> Self {
        LabelValue::Str(s)
    }
}

impl From<i64> for LabelValue {
    fn from(i: i64) -> Self {
        LabelValue::Int(i)
    }
}

impl From<i32> for LabelValue {
    fn from(i: i32) -> Self {
        LabelValue::Int(i64::from(i))
    }
}

impl From<u32> for LabelValue {
    fn from(i: u32) -> Self {
        LabelValue::Int(i64::from(i))
    }
}

impl From<f64> for LabelValue {
    fn from(v: f64) -> Self {
        LabelValue::Float(v)
    }
}

impl From<bool> for LabelValue {
    fn from(b: bool) -> Self {
        LabelValue::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Label sets
// ---------------------------------------------------------------------------

/// An unordered set of named metadata fields identifying the source of an
/// observation.
///
/// Backed by a `BTreeMap`, so iteration and serialization always emit keys
/// in ascending order regardless of how the set was built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    fields: BTreeMap<String, LabelValue>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<LabelValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<LabelValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&LabelValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, LabelValue> {
        self.fields.iter()
    }

    /// Canonical form: JSON with keys in ascending order.
    pub fn canonical_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::invalid(format!("unserializable labels: {e}")))
    }

    /// Digest of the canonical form; the grouping identity of this set.
    pub fn group_key(&self) -> Result<GroupKey> {
        let bytes = self.canonical_json()?;
        let digest = Sha256::digest(&bytes);
        Ok(GroupKey(digest.into()))
    }
}

impl<K, V> FromIterator<(K, V)> for LabelSet
where
    K: Into<String>,
    V: Into<LabelValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        LabelSet { fields }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for LabelSet
where
    K: Into<String>,
    V: Into<LabelValue>,
{
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Group keys
// ---------------------------------------------------------------------------

/// SHA-256 digest of a label set's canonical form.
///
/// Label sets with identical content map to the same key; sets differing in
/// any key or value map to distinct keys with overwhelming probability.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupKey([u8; 32]);

impl GroupKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_json_sorts_keys() {
        let labels = LabelSet::new()
            .with("zone", "us-east")
            .with("app", "api")
            .with("method", "GET");
        let json = String::from_utf8(labels.canonical_json().unwrap()).unwrap();
        assert_eq!(json, r#"{"app":"api","method":"GET","zone":"us-east"}"#);
    }

    #[test]
    fn test_group_key_ignores_insertion_order() {
        let a = LabelSet::new().with("method", "GET").with("status", 200);
        let b = LabelSet::new().with("status", 200).with("method", "GET");
        assert_eq!(a.group_key().unwrap(), b.group_key().unwrap());
    }

    #[test]
    fn test_group_key_distinct_on_any_difference() {
        let base = LabelSet::new().with("method", "GET").with("status", 200);
        let other_value = LabelSet::new().with("method", "GET").with("status", 500);
        let other_key = LabelSet::new().with("method", "GET").with("code", 200);
        assert_ne!(base.group_key().unwrap(), other_value.group_key().unwrap());
        assert_ne!(base.group_key().unwrap(), other_key.group_key().unwrap());
    }

    #[test]
    fn test_group_key_display_is_hex() {
        let key = LabelSet::new().with("a", 1).group_key().unwrap();
        let s = key.to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(s, s.to_lowercase());
    }

    #[test]
    fn test_value_types_keep_distinct_identity() {
        // 200 and "200" are different label values, hence different groups.
        let as_int = LabelSet::new().with("status", 200);
        let as_str = LabelSet::new().with("status", "200");
        assert_ne!(as_int.group_key().unwrap(), as_str.group_key().unwrap());
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut labels = LabelSet::new();
        labels.insert("env", "staging");
        labels.insert("env", "prod");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("env"), Some(&LabelValue::Str("prod".into())));
    }

    #[test]
    fn test_from_array() {
        let labels = LabelSet::from([("method", "GET"), ("path", "/health")]);
        assert_eq!(labels.len(), 2);
        assert_eq!(
            labels.get("method"),
            Some(&LabelValue::Str("GET".to_string()))
        );
    }
}
