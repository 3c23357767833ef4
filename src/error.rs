//! Crate-wide error type.
//!
//! Validation errors from user scripts fail loudly; everything the engine
//! reports is wrapped so callers see a single error surface.

use crate::engine::EngineError;
use thiserror::Error;

/// Errors produced by scene scripting, finalization, and metadata export.
#[derive(Debug, Error)]
pub enum Error {
    /// A shading mode string was neither `"flat"` nor `"smooth"`.
    #[error("invalid shading mode `{0}` (expected \"flat\" or \"smooth\")")]
    InvalidShading(String),

    /// A dynamic scale value did not have 1 or 3 components.
    #[error("scale requires 1 or 3 components, got {0}")]
    InvalidScale(usize),

    /// Metadata export was requested on a scene without an output directory.
    #[error("no output directory configured")]
    NoOutputDir,

    /// Metadata export was requested before the scene was finalized.
    #[error("scene has not been finalized")]
    NotFinalized,

    /// Error reported by the host engine backend.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
