use thiserror::Error;

#[derive(Error, Debug)]
pub enum LunkError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Level error: {0}")]
    Level(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, LunkError>;
