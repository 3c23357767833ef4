//! # Headless Engine
//!
//! An in-memory [`Engine`] implementation that records everything it is
//! asked to do instead of rendering. Used by the test suite and for dry
//! runs of scene scripts outside the host engine.
//!
//! The supported pass-toggle set is configurable so degraded engine builds
//! (missing passes) can be simulated.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::engine::{Engine, EngineError, EngineId, PassToggles, Primitive, Shading, Transform};
use crate::render::compositor::CompositorGraph;
use crate::render::passes::RenderPass;
use crate::scene::world::{ShaderNode, WorldGraph};

/// Recorded state of one engine-side object.
#[derive(Debug, Clone)]
pub struct HeadlessObject {
    pub name: String,
    pub primitive: Option<Primitive>,
    pub asset: Option<(PathBuf, Option<String>)>,
    pub transform: Transform,
    pub pass_index: u32,
    pub shading: Shading,
    pub properties: BTreeMap<String, Value>,
    pub show_axes: bool,
    pub show_name: bool,
}

/// Recording engine backend. See the module docs.
pub struct HeadlessEngine {
    next_id: u64,
    objects: BTreeMap<EngineId, HeadlessObject>,
    toggles: BTreeMap<String, bool>,
    asset_objects: BTreeMap<PathBuf, Vec<String>>,
    asset_worlds: BTreeMap<PathBuf, Vec<String>>,
    world: Option<WorldGraph>,
    imported_world: Option<(PathBuf, Option<String>, BTreeMap<String, Value>)>,
    compositor: Option<CompositorGraph>,
    loaded_images: BTreeSet<PathBuf>,
    image_loads: u32,
    active_camera: Option<(EngineId, f32)>,
    resolution: (u32, u32),
    time_limit: f32,
    renders: u32,
    last_write_files: Option<bool>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    /// Engine supporting every known pass toggle.
    pub fn new() -> Self {
        Self::with_supported_toggles(
            &RenderPass::ALL
                .iter()
                .map(|p| p.toggle())
                .collect::<Vec<_>>(),
        )
    }

    /// Engine supporting only the given toggle names, simulating an older
    /// or reduced build.
    pub fn with_supported_toggles(names: &[&str]) -> Self {
        Self {
            next_id: 0,
            objects: BTreeMap::new(),
            toggles: names.iter().map(|n| (n.to_string(), false)).collect(),
            asset_objects: BTreeMap::new(),
            asset_worlds: BTreeMap::new(),
            world: None,
            imported_world: None,
            compositor: None,
            loaded_images: BTreeSet::new(),
            image_loads: 0,
            active_camera: None,
            resolution: (0, 0),
            time_limit: 0.0,
            renders: 0,
            last_write_files: None,
        }
    }

    /// Register a fake asset file and the object/world names it contains,
    /// so instancing and world imports can resolve against it.
    pub fn add_asset_file(&mut self, path: impl Into<PathBuf>, objects: &[&str], worlds: &[&str]) {
        let path = path.into();
        self.asset_objects
            .insert(path.clone(), objects.iter().map(|s| s.to_string()).collect());
        self.asset_worlds
            .insert(path, worlds.iter().map(|s| s.to_string()).collect());
    }

    pub fn objects(&self) -> impl Iterator<Item = (&EngineId, &HeadlessObject)> {
        self.objects.iter()
    }

    pub fn object(&self, id: EngineId) -> Option<&HeadlessObject> {
        self.objects.get(&id)
    }

    /// Toggle names currently switched on.
    pub fn enabled_toggles(&self) -> BTreeSet<String> {
        self.toggles
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn world(&self) -> Option<&WorldGraph> {
        self.world.as_ref()
    }

    pub fn imported_world(&self) -> Option<&(PathBuf, Option<String>, BTreeMap<String, Value>)> {
        self.imported_world.as_ref()
    }

    pub fn compositor(&self) -> Option<&CompositorGraph> {
        self.compositor.as_ref()
    }

    /// Number of actual (non-cached) image loads performed.
    pub fn image_loads(&self) -> u32 {
        self.image_loads
    }

    pub fn active_camera(&self) -> Option<(EngineId, f32)> {
        self.active_camera
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn time_limit(&self) -> f32 {
        self.time_limit
    }

    pub fn renders(&self) -> u32 {
        self.renders
    }

    pub fn last_write_files(&self) -> Option<bool> {
        self.last_write_files
    }

    fn alloc_id(&mut self) -> EngineId {
        self.next_id += 1;
        EngineId(self.next_id)
    }
}

impl PassToggles for HeadlessEngine {
    fn has_pass_toggle(&self, name: &str) -> bool {
        self.toggles.contains_key(name)
    }

    fn set_pass_toggle(&mut self, name: &str, enabled: bool) {
        match self.toggles.get_mut(name) {
            Some(toggle) => *toggle = enabled,
            None => log::debug!("ignoring unknown pass toggle '{name}'"),
        }
    }
}

impl Engine for HeadlessEngine {
    fn create_object(&mut self, name: &str, primitive: &Primitive) -> EngineId {
        let id = self.alloc_id();
        self.objects.insert(
            id,
            HeadlessObject {
                name: name.to_string(),
                primitive: Some(primitive.clone()),
                asset: None,
                transform: Transform::default(),
                pass_index: 0,
                shading: Shading::Flat,
                properties: BTreeMap::new(),
                show_axes: false,
                show_name: false,
            },
        );
        id
    }

    fn instance_asset(
        &mut self,
        path: &Path,
        object_name: Option<&str>,
        instance_name: &str,
    ) -> Result<EngineId, EngineError> {
        let not_found = || EngineError::AssetNotFound {
            path: path.to_path_buf(),
            name: object_name.map(str::to_string),
        };
        let contents = self.asset_objects.get(path).ok_or_else(not_found)?;
        let resolved = match object_name {
            Some(name) => contents
                .iter()
                .find(|n| n.as_str() == name)
                .ok_or_else(not_found)?,
            None => contents.first().ok_or_else(not_found)?,
        };
        let resolved = resolved.clone();

        let id = self.alloc_id();
        self.objects.insert(
            id,
            HeadlessObject {
                name: instance_name.to_string(),
                primitive: None,
                asset: Some((path.to_path_buf(), Some(resolved))),
                transform: Transform::default(),
                pass_index: 0,
                shading: Shading::Flat,
                properties: BTreeMap::new(),
                show_axes: false,
                show_name: false,
            },
        );
        Ok(id)
    }

    fn set_transform(&mut self, id: EngineId, transform: &Transform) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.transform = *transform;
        }
    }

    fn set_pass_index(&mut self, id: EngineId, index: u32) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.pass_index = index;
        }
    }

    fn set_shading(&mut self, id: EngineId, shading: Shading) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.shading = shading;
        }
    }

    fn set_object_property(&mut self, id: EngineId, key: &str, value: &Value) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.properties.insert(key.to_string(), value.clone());
        }
    }

    fn set_debug_display(&mut self, id: EngineId, axes: bool, name: bool) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.show_axes = axes;
            object.show_name = name;
        }
    }

    fn set_active_camera(&mut self, id: EngineId, fov_degrees: f32) {
        self.active_camera = Some((id, fov_degrees));
    }

    fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = (width, height);
    }

    fn set_time_limit(&mut self, seconds: f32) {
        self.time_limit = seconds;
    }

    fn install_world(&mut self, graph: &WorldGraph) -> Result<(), EngineError> {
        for node in graph.nodes() {
            if let ShaderNode::EnvironmentTexture { path } = &node.kind {
                // Image loads are idempotent per path
                if self.loaded_images.insert(path.clone()) {
                    self.image_loads += 1;
                }
            }
        }
        self.imported_world = None;
        self.world = Some(graph.clone());
        Ok(())
    }

    fn load_world_asset(
        &mut self,
        path: &Path,
        world_name: Option<&str>,
        params: &BTreeMap<String, Value>,
    ) -> Result<(), EngineError> {
        let not_found = || EngineError::AssetNotFound {
            path: path.to_path_buf(),
            name: world_name.map(str::to_string),
        };
        let worlds = self.asset_worlds.get(path).ok_or_else(not_found)?;
        let resolved = match world_name {
            Some(name) => worlds
                .iter()
                .find(|n| n.as_str() == name)
                .ok_or_else(not_found)?,
            None => worlds.first().ok_or_else(not_found)?,
        };

        self.world = None;
        self.imported_world = Some((
            path.to_path_buf(),
            Some(resolved.clone()),
            params.clone(),
        ));
        Ok(())
    }

    fn install_compositor(&mut self, graph: &CompositorGraph) -> Result<(), EngineError> {
        self.compositor = Some(graph.clone());
        Ok(())
    }

    fn render(&mut self, write_files: bool) -> Result<(), EngineError> {
        self.renders += 1;
        self.last_write_files = Some(write_files);
        Ok(())
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.world = None;
        self.imported_world = None;
        self.compositor = None;
        self.active_camera = None;
        for toggle in self.toggles.values_mut() {
            *toggle = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::world::{HdriWorld, World};

    #[test]
    fn test_instance_asset_resolves_names() {
        let mut engine = HeadlessEngine::new();
        engine.add_asset_file("props.blend", &["Crate", "Barrel"], &[]);

        let id = engine
            .instance_asset(Path::new("props.blend"), None, "Crate.001")
            .unwrap();
        let object = engine.object(id).unwrap();
        assert_eq!(object.asset.as_ref().unwrap().1.as_deref(), Some("Crate"));

        let err = engine
            .instance_asset(Path::new("props.blend"), Some("Missing"), "X")
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetNotFound { .. }));

        let err = engine
            .instance_asset(Path::new("absent.blend"), None, "X")
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetNotFound { .. }));
    }

    #[test]
    fn test_hdri_image_loads_are_idempotent() {
        let mut engine = HeadlessEngine::new();
        let world = World::Hdri(HdriWorld::new("studio.exr"));

        world.apply(&mut engine).unwrap();
        world.apply(&mut engine).unwrap();
        assert_eq!(engine.image_loads(), 1);
    }

    #[test]
    fn test_world_asset_import() {
        let mut engine = HeadlessEngine::new();
        engine.add_asset_file("worlds.blend", &[], &["Sunset", "Night"]);

        let params = BTreeMap::from([("intensity".to_string(), Value::from(2.0))]);
        engine
            .load_world_asset(Path::new("worlds.blend"), None, &params)
            .unwrap();
        let (path, name, applied) = engine.imported_world().unwrap();
        assert_eq!(path, Path::new("worlds.blend"));
        assert_eq!(name.as_deref(), Some("Sunset"));
        assert_eq!(applied["intensity"], Value::from(2.0));

        let err = engine
            .load_world_asset(Path::new("worlds.blend"), Some("Noon"), &params)
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetNotFound { .. }));
    }

    #[test]
    fn test_clear_resets_generated_state() {
        let mut engine = HeadlessEngine::new();
        engine.create_object("Cube", &Primitive::Cube { size: 2.0 });
        engine.set_pass_toggle("use_pass_z", true);
        engine.clear();

        assert_eq!(engine.objects().count(), 0);
        assert!(engine.enabled_toggles().is_empty());
        // Supported toggle set survives a clear
        assert!(engine.has_pass_toggle("use_pass_z"));
    }
}
