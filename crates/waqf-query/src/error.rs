use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("backend returned no data and no error")]
    EmptyResponse,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("observer has no query key")]
    NoKey,

    #[error("observer is unmounted")]
    Unmounted,
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Decode(e.to_string())
    }
}
