//! Rows and column definitions shared by every output format.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ExportError, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or_default(),
            },
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Column key -> value. Missing keys render as empty cells.
pub type Row = BTreeMap<String, CellValue>;

/// Decode a JSON array of objects into rows.
pub fn rows_from_json(value: &Value) -> Result<Vec<Row>> {
    let items = value
        .as_array()
        .ok_or_else(|| ExportError::InvalidRows("expected a JSON array".into()))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let obj = item
                .as_object()
                .ok_or_else(|| ExportError::InvalidRows(format!("row {i} is not an object")))?;
            Ok(obj.iter().map(|(k, v)| (k.clone(), CellValue::from(v))).collect())
        })
        .collect()
}

pub type Transform = Arc<dyn Fn(&CellValue) -> String + Send + Sync>;

#[derive(Clone)]
pub struct ColumnDef {
    pub key: String,
    pub label: String,
    transform: Option<Transform>,
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            transform: None,
        }
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&CellValue) -> String + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    pub fn value<'a>(&self, row: &'a Row) -> &'a CellValue {
        const NULL: &CellValue = &CellValue::Null;
        row.get(&self.key).unwrap_or(NULL)
    }

    /// Text shown for this column in `row`.
    pub fn render(&self, row: &Row) -> String {
        let value = self.value(row);
        match &self.transform {
            Some(transform) => transform(value),
            None => value.to_string(),
        }
    }

    /// Parse `key:label,key:label`. A bare key is its own label.
    pub fn parse_list(spec: &str) -> Result<Vec<ColumnDef>> {
        spec.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, label) = part.split_once(':').unwrap_or((part, part));
                let key = key.trim();
                if key.is_empty() {
                    return Err(ExportError::InvalidColumn(part.to_string()));
                }
                Ok(ColumnDef::new(key, label.trim()))
            })
            .collect()
    }
}
