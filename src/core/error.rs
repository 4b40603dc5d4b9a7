use thiserror::Error;

#[derive(Error, Debug)]
pub enum WellError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Well index out of range: {0}")]
    InvalidWell(usize),

    #[error("Insufficient energy: needed {needed:.1}, available {available:.1}")]
    InsufficientEnergy { needed: f64, available: f64 },

    #[error("Session is not in an active playing state")]
    NotPlaying,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WellError>;
