//! Boundary to the hosted data backend.
//!
//! The backend answers every call with a `{data, error}` pair. Nothing here
//! assumes transactional guarantees beyond that answer.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;
use crate::keys::FilterSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<BackendError>,
}

impl BackendResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: BackendError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// An error wins over data.
    pub fn into_result(self) -> Result<Value, QueryError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(QueryError::Backend(error)),
            (Some(data), None) => Ok(data),
            (None, None) => Err(QueryError::EmptyResponse),
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Rows of `table` matching every filter (equality, or membership for
    /// list values).
    async fn select(&self, table: &str, filters: Option<&FilterSet>) -> BackendResponse;

    /// Invoke a stored procedure with JSON arguments.
    async fn rpc(&self, function: &str, args: &Value) -> BackendResponse;
}
