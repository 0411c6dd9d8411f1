use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaqfError {
    // IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found at {0}; run `waqf init` first")]
    ConfigNotFound(String),

    // Vocabulary
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown mutation action: {0}")]
    UnknownAction(String),

    #[error("Unknown text direction: {0}")]
    UnknownDirection(String),

    // Serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),
}

pub type Result<T> = std::result::Result<T, WaqfError>;
