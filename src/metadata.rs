//! # Metadata Export
//!
//! Serializes scene- and object-level state into the sidecar document
//! written next to each render's image files. Downstream dataset tooling
//! reads this to recover labels, transforms, and custom parameters without
//! reopening the engine.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scene::{Object, Scene};
use crate::{Error, Result};

/// Per-object record of the sidecar document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectMeta {
    pub index: u32,
    pub name: String,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, Value>,
    pub location: [f32; 3],
    /// Euler angles in radians, for readability.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub custom_meta: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_degrees: Option<f32>,
}

impl ObjectMeta {
    fn from_object(object: &Object, fov_degrees: Option<f32>) -> Self {
        let location = object.location();
        let scale = object.scale();
        Self {
            index: object.index(),
            name: object.name(),
            tags: object.tags().into_iter().collect(),
            properties: object.properties(),
            location: [location.x, location.y, location.z],
            rotation: object.rotation_euler(),
            scale: [scale.x, scale.y, scale.z],
            custom_meta: object.custom_meta(),
            fov_degrees,
        }
    }
}

/// Top-level sidecar document, one per rendered image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneMeta {
    pub resolution: (u32, u32),
    pub time_limit: f32,
    pub passes: Vec<String>,
    pub tags: Vec<String>,
    pub objects: Vec<ObjectMeta>,
    pub camera: ObjectMeta,
    pub custom_meta: BTreeMap<String, Value>,
}

impl SceneMeta {
    /// Snapshot the scene. Objects appear in creation order, which is also
    /// ascending identity-index order.
    pub fn from_scene(scene: &Scene) -> Self {
        let camera = scene.camera();
        Self {
            resolution: scene.resolution(),
            time_limit: scene.time_limit(),
            passes: scene.passes().iter().map(|p| p.name().to_string()).collect(),
            tags: scene.tags().iter().cloned().collect(),
            objects: scene
                .objects()
                .iter()
                .map(|o| ObjectMeta::from_object(o, None))
                .collect(),
            camera: ObjectMeta::from_object(camera.object(), Some(camera.fov_degrees())),
            custom_meta: scene.custom_meta().clone(),
        }
    }
}

/// Write the sidecar document to `{output_dir}/{run_dir}/{filename}` and
/// return the written path.
pub fn save(scene: &Scene, filename: &str) -> Result<PathBuf> {
    let output_dir = scene.output_dir().ok_or(Error::NoOutputDir)?;
    let run_dir = scene.run_dir().ok_or(Error::NotFinalized)?;

    let dir = output_dir.join(run_dir);
    fs::create_dir_all(&dir)?;

    let path = dir.join(filename);
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, &SceneMeta::from_scene(scene))?;
    Ok(path)
}
