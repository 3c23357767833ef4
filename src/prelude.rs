//! # Cairn Prelude
//!
//! This module provides a convenient way to import commonly used types and
//! traits for writing scene scripts. It's designed to reduce boilerplate
//! imports in typical dataset generators.
//!
//! ## Usage
//!
//! ```rust
//! use cairn::prelude::*;
//! ```
//!
//! This brings all essential types into scope, allowing you to write:
//!
//! ```no_run
//! use cairn::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     cairn::driver::init_logging();
//!     let mut engine = cairn::headless();
//!
//!     let mut script = |scene: &mut Scene| -> cairn::Result<()> {
//!         scene.set_passes([RenderPass::Z, RenderPass::Normal]);
//!         let cube = scene.create_cube();
//!         cube.set_location((0.0, 0.0, 1.0)).set_tags("cube");
//!         scene.camera().point_at(&cube, 0.0);
//!         Ok(())
//!     };
//!
//!     render_batch(&mut engine, &mut script, Path::new("out"), 10)?;
//!     Ok(())
//! }
//! ```

// Re-export the driver surface
pub use crate::driver::{init_logging, render_batch, render_once, SceneScript, META_FILENAME};

// Re-export scene and object types
pub use crate::scene::{
    Camera, ColorParams, HdriParams, IntoScale, IntoTags, Object, ObjectLoader, Scene, SkyParams,
    World, DEFAULT_FOV_DEGREES,
};

// Re-export render configuration
pub use crate::render::compositor::OutputFormat;
pub use crate::render::passes::RenderPass;

// Re-export the engine interface
pub use crate::engine::{Engine, HeadlessEngine, Shading};

// Re-export error types
pub use crate::error::{Error, Result};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Quaternion, Vector3, Zero};
