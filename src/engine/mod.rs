//! # Host Engine Interface
//!
//! The crate does not rasterize anything itself: it configures a host
//! 3D engine and asks it to render. This module defines the capability
//! interface that hosts must provide - create a primitive, set a transform,
//! flip a named render-pass flag, install a node graph, render - plus the
//! value types shared across that boundary.
//!
//! [`headless::HeadlessEngine`] is a complete in-memory implementation used
//! for tests and dry runs.

pub mod headless;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cgmath::{One, Quaternion, Vector3};
use serde_json::Value;
use thiserror::Error;

use crate::render::compositor::CompositorGraph;
use crate::scene::world::WorldGraph;

pub use headless::HeadlessEngine;

/// Identifier the engine hands back for a created scene-graph object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(pub u64);

/// Mesh primitives (and non-mesh placeholders) the engine can instantiate.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Cube {
        size: f32,
    },
    Sphere {
        radius: f32,
        segments: u32,
        ring_count: u32,
    },
    Plane {
        size: f32,
    },
    /// Transform-only object, useful as a point-at target.
    Empty,
    Camera,
}

/// Location / rotation / scale triple applied to an engine object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub location: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Mesh surface shading mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    #[default]
    Flat,
    Smooth,
}

impl FromStr for Shading {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Shading::Flat),
            "smooth" => Ok(Shading::Smooth),
            other => Err(crate::Error::InvalidShading(other.to_string())),
        }
    }
}

/// Errors reported by an engine backend.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An asset file, or a named datablock inside one, was not found.
    #[error("asset not found: {path:?} (name {name:?})")]
    AssetNotFound {
        path: PathBuf,
        name: Option<String>,
    },

    /// An image file referenced by the world could not be loaded.
    #[error("image not found: {0:?}")]
    ImageNotFound(PathBuf),

    /// The engine rejected a render invocation.
    #[error("render failed: {0}")]
    Render(String),
}

/// Named boolean render-pass flags on the engine's active view layer.
///
/// Which flags exist varies across engine versions and builds; the pass
/// configuration engine probes with [`has_pass_toggle`](Self::has_pass_toggle)
/// and degrades to a warning for missing ones.
pub trait PassToggles {
    fn has_pass_toggle(&self, name: &str) -> bool;
    fn set_pass_toggle(&mut self, name: &str, enabled: bool);
}

/// Scene-graph and render capabilities of the host engine.
///
/// All mutation happens on the host's main thread; the trait is consumed
/// synchronously during scene finalization and rendering.
pub trait Engine: PassToggles {
    /// Instantiate a primitive and return its handle.
    fn create_object(&mut self, name: &str, primitive: &Primitive) -> EngineId;

    /// Instance an object from an external asset file. `object_name = None`
    /// instances the first object in the file.
    fn instance_asset(
        &mut self,
        path: &Path,
        object_name: Option<&str>,
        instance_name: &str,
    ) -> Result<EngineId, EngineError>;

    fn set_transform(&mut self, id: EngineId, transform: &Transform);

    /// Write the per-object integer index used by the object-index buffer.
    fn set_pass_index(&mut self, id: EngineId, index: u32);

    fn set_shading(&mut self, id: EngineId, shading: Shading);

    fn set_object_property(&mut self, id: EngineId, key: &str, value: &Value);

    /// Viewport-only debug display of axes and object name.
    fn set_debug_display(&mut self, id: EngineId, axes: bool, name: bool);

    /// Select the render camera and set its field of view in degrees.
    fn set_active_camera(&mut self, id: EngineId, fov_degrees: f32);

    fn set_resolution(&mut self, width: u32, height: u32);

    /// Per-image render time budget in seconds.
    fn set_time_limit(&mut self, seconds: f32);

    /// Replace the world lighting graph. Image loads referenced by the
    /// graph must be idempotent per path.
    fn install_world(&mut self, graph: &WorldGraph) -> Result<(), EngineError>;

    /// Load a world definition from an asset file (`world_name = None` picks
    /// the first) and apply extra key/value parameters onto it.
    fn load_world_asset(
        &mut self,
        path: &Path,
        world_name: Option<&str>,
        params: &BTreeMap<String, Value>,
    ) -> Result<(), EngineError>;

    /// Replace the compositor graph with a freshly built output graph.
    fn install_compositor(&mut self, graph: &CompositorGraph) -> Result<(), EngineError>;

    /// Render one image. `write_files = false` renders for preview only.
    fn render(&mut self, write_files: bool) -> Result<(), EngineError>;

    /// Remove all generated objects and installed graphs, keeping the
    /// engine usable for the next scene.
    fn clear(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shading_from_str() {
        assert_eq!(Shading::from_str("flat").unwrap(), Shading::Flat);
        assert_eq!(Shading::from_str("smooth").unwrap(), Shading::Smooth);
        assert!(matches!(
            Shading::from_str("phong"),
            Err(crate::Error::InvalidShading(s)) if s == "phong"
        ));
    }

    #[test]
    fn test_default_transform_is_identity() {
        let t = Transform::default();
        assert_eq!(t.location, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(t.rotation, Quaternion::one());
        assert_eq!(t.scale, Vector3::new(1.0, 1.0, 1.0));
    }
}
