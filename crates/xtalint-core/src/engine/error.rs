use thiserror::Error;

use super::config::ConfigError;
use crate::core::crystal::error::CrystalError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Crystal description error: {source}")]
    Crystal {
        #[from]
        source: CrystalError,
    },

    #[error("Failed to build worker pool with {threads} threads: {reason}")]
    ThreadPool { threads: usize, reason: String },

    #[error("Surface worker failed, discarding partial results: {0}")]
    AsaWorker(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
