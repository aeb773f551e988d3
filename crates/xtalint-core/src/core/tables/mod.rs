//! Immutable lookup tables consumed by the surface and contact engines.
//!
//! Tables are plain values built once (from the compiled-in defaults or from
//! a file) and passed by reference into the engine, so alternative parameter
//! sets can be injected without touching global state.

pub mod radii;
pub mod reference_asa;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid entry in '{path}': {message}")]
    InvalidEntry { path: String, message: String },
}
