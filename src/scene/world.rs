//! # World (Environment Lighting)
//!
//! One world is active per scene, selected from a closed set of variants:
//! a flat color, a procedural sky, a panoramic HDRI image, or a world
//! imported from an asset file. Replacing the world discards the previous
//! variant's parameters.
//!
//! Every variant keeps its options as `Option<_>` fields so "unset" stays
//! distinguishable from "set to the default": unset options leave the
//! engine's own default untouched. Finalization materializes the variant
//! into a shader node graph (or an asset-load request) the engine installs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::engine::{Engine, EngineError};
use crate::graph::NodeGraph;

/// Shader nodes of the world lighting graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderNode {
    /// Environment emission with optional flat color and strength.
    Background {
        color: Option<[f32; 4]>,
        strength: Option<f32>,
    },
    /// Procedural sky texture. Unset fields keep engine defaults.
    SkyTexture {
        sun_size: Option<f32>,
        sun_intensity: Option<f32>,
        sun_elevation: Option<f32>,
        rotation_z: Option<f32>,
        altitude: Option<f32>,
        air: Option<f32>,
        dust: Option<f32>,
        ozone: Option<f32>,
    },
    /// Panoramic image lookup; loads are idempotent per path.
    EnvironmentTexture { path: PathBuf },
    /// Texture-coordinate remapping, used to rotate an HDRI.
    Mapping { rotation_z: Option<f32> },
    TextureCoordinate,
    WorldOutput,
}

/// The lighting graph handed to the engine.
pub type WorldGraph = NodeGraph<ShaderNode>;

/// Options of the flat-color world.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorParams {
    pub color: Option<[f32; 4]>,
    pub strength: Option<f32>,
}

/// Options of the procedural-sky world.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkyParams {
    pub strength: Option<f32>,
    pub sun_size: Option<f32>,
    pub sun_intensity: Option<f32>,
    pub sun_elevation: Option<f32>,
    /// Angle representing the sun direction.
    pub rotation_z: Option<f32>,
    pub altitude: Option<f32>,
    pub air: Option<f32>,
    pub dust: Option<f32>,
    pub ozone: Option<f32>,
}

/// Options of the HDRI-image world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HdriParams {
    pub path: Option<PathBuf>,
    pub strength: Option<f32>,
    pub rotation_z: Option<f32>,
}

/// Flat-color environment lighting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorWorld {
    pub color: Option<[f32; 4]>,
    pub strength: Option<f32>,
}

impl ColorWorld {
    /// Update only the provided options; omitted fields keep prior values.
    pub fn set_params(&mut self, params: ColorParams) -> &mut Self {
        if let Some(color) = params.color {
            self.color = Some(color);
        }
        if let Some(strength) = params.strength {
            self.strength = Some(strength);
        }
        self
    }

    fn build_graph(&self) -> WorldGraph {
        let mut graph = WorldGraph::new();
        let background = graph.add(ShaderNode::Background {
            color: self.color,
            strength: self.strength,
        });
        let output = graph.add(ShaderNode::WorldOutput);
        graph.link(background, "Background", output, "Surface");
        graph
    }
}

/// Procedural sky environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyWorld {
    pub strength: Option<f32>,
    pub sun_size: Option<f32>,
    pub sun_intensity: Option<f32>,
    pub sun_elevation: Option<f32>,
    pub rotation_z: Option<f32>,
    pub altitude: Option<f32>,
    pub air: Option<f32>,
    pub dust: Option<f32>,
    pub ozone: Option<f32>,
}

impl Default for SkyWorld {
    fn default() -> Self {
        // Atmosphere presets tuned for dataset renders; everything else
        // stays on engine defaults
        Self {
            strength: None,
            sun_size: None,
            sun_intensity: None,
            sun_elevation: None,
            rotation_z: None,
            altitude: None,
            air: Some(0.1),
            dust: Some(0.01),
            ozone: Some(10.0),
        }
    }
}

impl SkyWorld {
    /// Update only the provided options; omitted fields keep prior values.
    pub fn set_params(&mut self, params: SkyParams) -> &mut Self {
        if let Some(v) = params.strength {
            self.strength = Some(v);
        }
        if let Some(v) = params.sun_size {
            self.sun_size = Some(v);
        }
        if let Some(v) = params.sun_intensity {
            self.sun_intensity = Some(v);
        }
        if let Some(v) = params.sun_elevation {
            self.sun_elevation = Some(v);
        }
        if let Some(v) = params.rotation_z {
            self.rotation_z = Some(v);
        }
        if let Some(v) = params.altitude {
            self.altitude = Some(v);
        }
        if let Some(v) = params.air {
            self.air = Some(v);
        }
        if let Some(v) = params.dust {
            self.dust = Some(v);
        }
        if let Some(v) = params.ozone {
            self.ozone = Some(v);
        }
        self
    }

    fn build_graph(&self) -> WorldGraph {
        let mut graph = WorldGraph::new();
        let sky = graph.add(ShaderNode::SkyTexture {
            sun_size: self.sun_size,
            sun_intensity: self.sun_intensity,
            sun_elevation: self.sun_elevation,
            rotation_z: self.rotation_z,
            altitude: self.altitude,
            air: self.air,
            dust: self.dust,
            ozone: self.ozone,
        });
        let background = graph.add(ShaderNode::Background {
            color: None,
            strength: self.strength,
        });
        let output = graph.add(ShaderNode::WorldOutput);
        graph.link(sky, "Color", background, "Color");
        graph.link(background, "Background", output, "Surface");
        graph
    }
}

/// Environment lighting from a panoramic HDRI image.
#[derive(Debug, Clone, PartialEq)]
pub struct HdriWorld {
    pub path: PathBuf,
    pub strength: Option<f32>,
    pub rotation_z: Option<f32>,
}

impl HdriWorld {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            strength: None,
            rotation_z: None,
        }
    }

    /// Update only the provided options; omitted fields keep prior values.
    pub fn set_params(&mut self, params: HdriParams) -> &mut Self {
        if let Some(path) = params.path {
            self.path = path;
        }
        if let Some(strength) = params.strength {
            self.strength = Some(strength);
        }
        if let Some(rotation_z) = params.rotation_z {
            self.rotation_z = Some(rotation_z);
        }
        self
    }

    fn build_graph(&self) -> WorldGraph {
        let mut graph = WorldGraph::new();
        let coord = graph.add(ShaderNode::TextureCoordinate);
        let mapping = graph.add(ShaderNode::Mapping {
            rotation_z: self.rotation_z,
        });
        let env = graph.add(ShaderNode::EnvironmentTexture {
            path: self.path.clone(),
        });
        let background = graph.add(ShaderNode::Background {
            color: None,
            strength: self.strength,
        });
        let output = graph.add(ShaderNode::WorldOutput);
        graph.link(coord, "Generated", mapping, "Vector");
        graph.link(mapping, "Vector", env, "Vector");
        graph.link(env, "Color", background, "Color");
        graph.link(background, "Background", output, "Surface");
        graph
    }
}

/// World definition imported from an external asset file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedWorld {
    pub path: PathBuf,
    /// `None` imports the first world found in the file.
    pub world_name: Option<String>,
    params: BTreeMap<String, Value>,
}

impl ImportedWorld {
    pub fn new(path: impl Into<PathBuf>, world_name: Option<&str>) -> Self {
        Self {
            path: path.into(),
            world_name: world_name.map(str::to_string),
            params: BTreeMap::new(),
        }
    }

    /// Set an extra key/value parameter applied onto the imported world
    /// after it is loaded.
    pub fn set_param(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }
}

/// Environment lighting strategy, one active per scene.
#[derive(Debug, Clone, PartialEq)]
pub enum World {
    Color(ColorWorld),
    Sky(SkyWorld),
    Hdri(HdriWorld),
    Imported(ImportedWorld),
}

impl World {
    pub fn color() -> Self {
        World::Color(ColorWorld::default())
    }

    pub fn sky() -> Self {
        World::Sky(SkyWorld::default())
    }

    pub fn hdri(path: impl Into<PathBuf>) -> Self {
        World::Hdri(HdriWorld::new(path))
    }

    pub fn imported(path: impl Into<PathBuf>, world_name: Option<&str>) -> Self {
        World::Imported(ImportedWorld::new(path, world_name))
    }

    pub fn color_mut(&mut self) -> Option<&mut ColorWorld> {
        match self {
            World::Color(w) => Some(w),
            _ => None,
        }
    }

    pub fn sky_mut(&mut self) -> Option<&mut SkyWorld> {
        match self {
            World::Sky(w) => Some(w),
            _ => None,
        }
    }

    pub fn hdri_mut(&mut self) -> Option<&mut HdriWorld> {
        match self {
            World::Hdri(w) => Some(w),
            _ => None,
        }
    }

    pub fn imported_mut(&mut self) -> Option<&mut ImportedWorld> {
        match self {
            World::Imported(w) => Some(w),
            _ => None,
        }
    }

    /// Materialize the variant into the engine's lighting state.
    pub fn apply<E: Engine + ?Sized>(&self, engine: &mut E) -> Result<(), EngineError> {
        match self {
            World::Color(w) => engine.install_world(&w.build_graph()),
            World::Sky(w) => engine.install_world(&w.build_graph()),
            World::Hdri(w) => engine.install_world(&w.build_graph()),
            World::Imported(w) => {
                engine.load_world_asset(&w.path, w.world_name.as_deref(), &w.params)
            }
        }
    }
}
