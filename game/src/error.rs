use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("block count must be at least 2, got {0}")]
    TooFewBlocks(usize),
    #[error("base speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),
    #[error("speed per level must be finite and not negative, got {0}")]
    InvalidSpeedStep(f64),
    #[error("could not read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write score store {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode score store")]
    Encode(#[from] serde_json::Error),
    #[error("score store is unavailable: {0}")]
    Unavailable(String),
}
