//! Cache addressing and invalidation for the waqf administration client.
//!
//! Results fetched from the backend are cached under [`QueryKey`]s built by
//! [`QueryKeys`]. Writes go through [`QueryClient::mutate`], which applies the
//! [`InvalidationRules`] for the mutation only after it succeeds.

pub mod backend;
pub mod cache;
pub mod client;
pub mod error;
pub mod filters;
pub mod hooks;
pub mod invalidation;
pub mod keys;
pub mod observer;
pub mod realtime;
pub mod registry;

pub use backend::{Backend, BackendError, BackendResponse};
pub use cache::{CachedQuery, FetchTicket, QueryCache};
pub use client::{QueryClient, StalePolicy};
pub use error::QueryError;
pub use filters::QueryFilters;
pub use hooks::{DataSource, QuerySpec};
pub use invalidation::{InvalidationRules, MutationEvent};
pub use keys::{FilterSet, FilterValue, KeySegment, QueryKey};
pub use observer::{Observed, QueryObserver};
pub use realtime::{ChangeEvent, ChangeKind, RealtimeTable};
pub use registry::QueryKeys;
