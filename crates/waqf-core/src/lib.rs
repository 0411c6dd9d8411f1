pub mod config;
pub mod error;
pub mod types;

pub use error::{Result, WaqfError};
pub use types::{Entity, MutationAction, TextDirection};
