//! Query keys and filter normalization.
//!
//! A [`QueryKey`] is an immutable sequence of segments. Filter mappings are
//! normalized into a [`FilterSet`] before they become a segment: empty values
//! are stripped and entries are kept sorted by name, so two logically equal
//! filter mappings always produce equal keys. An empty filter set is not
//! embedded at all.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// A normalized filter value. Floating point numbers are kept in their
/// canonical decimal form so keys stay hashable and totally ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Number(String),
    Text(String),
    List(Vec<FilterValue>),
    /// Nested object, normalized by the same rules as the top level.
    Map(BTreeMap<String, FilterValue>),
}

impl FilterValue {
    /// Normalize one JSON value. Returns `None` for values that carry no
    /// filter: `null`, `""`, `[]` and `{}`.
    pub fn normalize(value: &Value) -> Option<FilterValue> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FilterValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FilterValue::Int(i)),
                None => match n.as_f64() {
                    Some(f) if is_integral(f) => Some(FilterValue::Int(f as i64)),
                    Some(f) if f.is_finite() => Some(FilterValue::Number(n.to_string())),
                    _ => None,
                },
            },
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(FilterValue::Text(s.clone())),
            Value::Array(items) => {
                let items: Vec<FilterValue> =
                    items.iter().filter_map(FilterValue::normalize).collect();
                if items.is_empty() {
                    None
                } else {
                    Some(FilterValue::List(items))
                }
            }
            Value::Object(map) => {
                let entries = normalize_map(map);
                if entries.is_empty() {
                    None
                } else {
                    Some(FilterValue::Map(entries))
                }
            }
        }
    }
}

/// Whole-valued floats address the same entry as the equal integer.
fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn normalize_map(map: &Map<String, Value>) -> BTreeMap<String, FilterValue> {
    map.iter()
        .filter_map(|(k, v)| FilterValue::normalize(v).map(|v| (k.clone(), v)))
        .collect()
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Int(i)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

/// Non-empty, key-sorted filter mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl FilterSet {
    /// Normalize an open mapping. `None` means "no filter".
    pub fn from_map(map: &Map<String, Value>) -> Option<FilterSet> {
        let entries = normalize_map(map);
        if entries.is_empty() {
            None
        } else {
            Some(FilterSet(entries))
        }
    }

    /// Normalize any serializable filter struct. Values that fail to
    /// serialize, or that are not mappings, yield "no filter".
    pub fn from_serialize<T: Serialize + ?Sized>(filters: &T) -> Option<FilterSet> {
        match serde_json::to_value(filters) {
            Ok(Value::Object(map)) => FilterSet::from_map(&map),
            Ok(Value::Null) => None,
            Ok(other) => {
                tracing::warn!(value = %other, "filters are not a mapping, ignoring");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "filters failed to serialize, ignoring");
                None
            }
        }
    }

    pub fn single(name: impl Into<String>, value: impl Into<FilterValue>) -> FilterSet {
        let mut entries = BTreeMap::new();
        entries.insert(name.into(), value.into());
        FilterSet(entries)
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeySegment {
    Text(String),
    Int(i64),
    Filters(FilterSet),
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        KeySegment::Text(s.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(s: String) -> Self {
        KeySegment::Text(s)
    }
}

impl From<&String> for KeySegment {
    fn from(s: &String) -> Self {
        KeySegment::Text(s.clone())
    }
}

impl From<i64> for KeySegment {
    fn from(i: i64) -> Self {
        KeySegment::Int(i)
    }
}

impl From<FilterSet> for KeySegment {
    fn from(f: FilterSet) -> Self {
        KeySegment::Filters(f)
    }
}

/// Structured cache address. Never mutated in place; the builder methods
/// return a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn root(root: impl Into<String>) -> QueryKey {
        QueryKey(vec![KeySegment::Text(root.into())])
    }

    pub fn from_segments(segments: Vec<KeySegment>) -> QueryKey {
        QueryKey(segments)
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn root_name(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeySegment::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn with(&self, segment: impl Into<KeySegment>) -> QueryKey {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        QueryKey(segments)
    }

    /// Append a filter segment, or nothing when there is no filter.
    pub fn with_filters(&self, filters: Option<FilterSet>) -> QueryKey {
        match filters {
            Some(f) => self.with(f),
            None => self.clone(),
        }
    }

    /// Segment-wise prefix match. Every key starts with itself.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
