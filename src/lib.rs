// src/lib.rs
//! Cairn Scene Scripting
//!
//! A scripting layer for procedurally generating labeled synthetic image
//! datasets through a host 3D engine: build a scene in code, render it with
//! the passes you need, and get a metadata sidecar next to every image.

pub mod driver;
pub mod engine;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod prelude;
pub mod preview;
pub mod render;
pub mod scene;

// Re-export main types for convenience
pub use driver::{render_batch, render_once, SceneScript};
pub use engine::{Engine, HeadlessEngine};
pub use error::{Error, Result};
pub use scene::{Camera, Object, Scene, World};

/// Creates a headless engine instance, useful for dry runs and tests
pub fn headless() -> HeadlessEngine {
    HeadlessEngine::new()
}
