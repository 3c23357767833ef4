//! # Scene
//!
//! The entity registry and configuration root user scripts mutate during
//! `generate`. A scene lives for exactly one rendered image: constructed by
//! the driver, filled in by the script, finalized once (pass and compositor
//! configuration pushed to the engine), consumed by the render and the
//! metadata export, then discarded.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use cgmath::Vector3;
use serde_json::Value;
use uuid::Uuid;

use crate::engine::{Engine, EngineId, Primitive};
use crate::render::compositor::build_output_graph;
use crate::render::passes::{configure_passes, enabled_channels, RenderPass};
use crate::scene::object::{Camera, Object, ObjectData, ObjectSource, DEFAULT_FOV_DEGREES};
use crate::scene::tags::IntoTags;
use crate::scene::world::World;
use crate::Result;

/// Declarative description of one image to render.
///
/// Object factory methods register each created object under a
/// monotonically increasing identity index, starting at 1. The index
/// doubles as the per-pixel segmentation label, so it is assigned once and
/// never reused within a scene's lifetime.
pub struct Scene {
    resolution: (u32, u32),
    time_limit: f32,
    passes: BTreeSet<RenderPass>,
    output_dir: Option<PathBuf>,
    run_dir: Option<String>,
    tags: BTreeSet<String>,
    custom_meta: BTreeMap<String, Value>,
    objects: Vec<Object>,
    camera: Camera,
    world: World,
    index_counter: u32,
}

impl Scene {
    /// Create a scene with default settings. `output_dir` of `None` puts
    /// every render into preview-only mode (nothing is written to disk).
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        // The camera exists from the start and sits outside the identity
        // counter: index 0 never appears in the object-index buffer
        let mut data = ObjectData::new("Camera", ObjectSource::Primitive(Primitive::Camera));
        data.location = Vector3::new(0.0, 0.0, 10.0);
        data.fov_degrees = Some(DEFAULT_FOV_DEGREES);
        let camera = Camera::from_object(Object::from_data(data));

        Self {
            resolution: (640, 640),
            time_limit: 3.0,
            passes: BTreeSet::new(),
            output_dir,
            run_dir: None,
            tags: BTreeSet::new(),
            custom_meta: BTreeMap::new(),
            objects: Vec::new(),
            camera,
            world: World::sky(),
            index_counter: 0,
        }
    }

    fn register(&mut self, mut data: ObjectData) -> Object {
        self.index_counter += 1;
        data.index = self.index_counter;
        let object = Object::from_data(data);
        self.objects.push(object.clone());
        object
    }

    /// Create a cube primitive (edge length 2, matching the engine
    /// default).
    pub fn create_cube(&mut self) -> Object {
        self.create_cube_named("Cube", 2.0)
    }

    pub fn create_cube_named(&mut self, name: &str, size: f32) -> Object {
        self.register(ObjectData::new(
            name,
            ObjectSource::Primitive(Primitive::Cube { size }),
        ))
    }

    /// Create a UV sphere primitive with default resolution.
    pub fn create_sphere(&mut self) -> Object {
        self.create_sphere_named("Sphere", 1.0, 32, 16)
    }

    pub fn create_sphere_named(
        &mut self,
        name: &str,
        radius: f32,
        segments: u32,
        ring_count: u32,
    ) -> Object {
        self.register(ObjectData::new(
            name,
            ObjectSource::Primitive(Primitive::Sphere {
                radius,
                segments,
                ring_count,
            }),
        ))
    }

    /// Create a plane primitive.
    pub fn create_plane(&mut self) -> Object {
        self.create_plane_named("Plane", 2.0)
    }

    pub fn create_plane_named(&mut self, name: &str, size: f32) -> Object {
        self.register(ObjectData::new(
            name,
            ObjectSource::Primitive(Primitive::Plane { size }),
        ))
    }

    /// Create an empty object. Useful as a point-at target or for
    /// debugging in the interactive preview.
    pub fn create_empty(&mut self) -> Object {
        self.create_empty_named("Empty")
    }

    pub fn create_empty_named(&mut self, name: &str) -> Object {
        self.register(ObjectData::new(name, ObjectSource::Primitive(Primitive::Empty)))
    }

    /// Loader for the first object in an external asset file.
    pub fn load_object(&mut self, path: impl Into<PathBuf>) -> ObjectLoader {
        ObjectLoader {
            path: path.into(),
            object_name: None,
        }
    }

    /// Loader for a named object in an external asset file.
    pub fn load_object_named(&mut self, path: impl Into<PathBuf>, name: &str) -> ObjectLoader {
        ObjectLoader {
            path: path.into(),
            object_name: Some(name.to_string()),
        }
    }

    /// Loaders for several named objects from one asset file.
    pub fn load_objects(&mut self, path: impl Into<PathBuf>, names: &[&str]) -> Vec<ObjectLoader> {
        let path = path.into();
        names
            .iter()
            .map(|name| ObjectLoader {
                path: path.clone(),
                object_name: Some(name.to_string()),
            })
            .collect()
    }

    /// Set the output image resolution.
    pub fn set_resolution(&mut self, width: u32, height: u32) -> &mut Self {
        self.resolution = (width, height);
        self
    }

    /// Set a square output resolution.
    pub fn set_resolution_square(&mut self, size: u32) -> &mut Self {
        self.set_resolution(size, size)
    }

    /// Maximum rendering time per image in seconds. Higher values trade
    /// speed for quality.
    pub fn set_time_limit(&mut self, seconds: f32) -> &mut Self {
        self.time_limit = seconds;
        self
    }

    /// Replace the set of render passes saved when rendering.
    pub fn set_passes(&mut self, passes: impl IntoIterator<Item = RenderPass>) -> &mut Self {
        self.passes = passes.into_iter().collect();
        self
    }

    /// Replace the scene's global tags (the image class labels).
    pub fn set_tags(&mut self, tags: impl IntoTags) -> &mut Self {
        self.tags = tags.into_tags();
        self
    }

    /// Add tags to the scene, keeping existing ones.
    pub fn add_tags(&mut self, tags: impl IntoTags) -> &mut Self {
        self.tags.extend(tags.into_tags());
        self
    }

    /// Attach scene-level custom metadata for the sidecar document.
    pub fn set_custom_meta(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.custom_meta.insert(key.to_string(), value.into());
        self
    }

    /// Handle to the render camera.
    pub fn camera(&self) -> Camera {
        self.camera.clone()
    }

    /// Replace the environment lighting, discarding the previous variant's
    /// parameters.
    pub fn set_world(&mut self, world: World) -> &mut World {
        self.world = world;
        &mut self.world
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn time_limit(&self) -> f32 {
        self.time_limit
    }

    pub fn passes(&self) -> &BTreeSet<RenderPass> {
        &self.passes
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn custom_meta(&self) -> &BTreeMap<String, Value> {
        &self.custom_meta
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Unique per-render subdirectory, assigned during [`finalize`](Self::finalize)
    /// when an output directory is configured.
    pub fn run_dir(&self) -> Option<&str> {
        self.run_dir.as_deref()
    }

    /// Push the generated scene to the engine and wire up passes and the
    /// output graph. Called once by the render driver after `generate`.
    pub fn finalize<E: Engine + ?Sized>(&mut self, engine: &mut E) -> Result<()> {
        engine.set_resolution(self.resolution.0, self.resolution.1);
        engine.set_time_limit(self.time_limit);

        let camera_id = apply_object(engine, self.camera.object())?;
        engine.set_active_camera(camera_id, self.camera.fov_degrees());

        for object in &self.objects {
            apply_object(engine, object)?;
        }

        self.world.apply(engine)?;

        let skipped = configure_passes(&self.passes, engine);
        if !skipped.is_empty() {
            log::debug!("{} requested pass(es) unavailable in this engine build", skipped.len());
        }

        // Skipped passes produce no render-layer channel, so they must not
        // get output slots either
        let effective: BTreeSet<RenderPass> = self
            .passes
            .iter()
            .copied()
            .filter(|pass| !skipped.contains(pass))
            .collect();

        let render_dir = match &self.output_dir {
            Some(dir) => {
                let run = Uuid::new_v4().to_string();
                let render_dir = dir.join(&run);
                self.run_dir = Some(run);
                Some(render_dir)
            }
            None => None,
        };

        let channels = enabled_channels(&effective);
        let graph = build_output_graph(&channels, render_dir.as_deref());
        engine.install_compositor(&graph)?;

        Ok(())
    }

    /// Serialize the scene state to `{output_dir}/{run_dir}/{filename}`.
    /// Called once per render, after the render completes.
    pub fn save_metadata(&self, filename: &str) -> Result<PathBuf> {
        crate::metadata::save(self, filename)
    }
}

/// Create the engine-side object and push every piece of recorded state,
/// including the identity index the object-index buffer must report.
fn apply_object<E: Engine + ?Sized>(engine: &mut E, object: &Object) -> Result<EngineId> {
    let data = object.data();
    let id = match &data.source {
        ObjectSource::Primitive(primitive) => engine.create_object(&data.name, primitive),
        ObjectSource::Asset { path, object_name } => {
            engine.instance_asset(path, object_name.as_deref(), &data.name)?
        }
    };

    engine.set_transform(id, &object.transform());
    engine.set_pass_index(id, data.index);
    engine.set_shading(id, data.shading);
    for (key, value) in &data.properties {
        engine.set_object_property(id, key, value);
    }
    if data.show_axes || data.show_name {
        engine.set_debug_display(id, data.show_axes, data.show_name);
    }

    Ok(id)
}

/// Factory for instancing an object from an external asset file.
///
/// The engine resolves (and reports missing) assets during finalization;
/// the loader itself only records what to instance.
pub struct ObjectLoader {
    path: PathBuf,
    object_name: Option<String>,
}

impl ObjectLoader {
    /// Register a new instance of the loaded object. `name` of `None`
    /// falls back to the asset's object name or file stem.
    pub fn create_instance(&self, scene: &mut Scene, name: Option<&str>) -> Object {
        let fallback = self
            .object_name
            .clone()
            .or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "Instance".to_string());

        scene.register(ObjectData::new(
            name.unwrap_or(&fallback),
            ObjectSource::Asset {
                path: self.path.clone(),
                object_name: self.object_name.clone(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_monotonic_from_one() {
        let mut scene = Scene::new(None);
        let indices: Vec<u32> = (0..5)
            .map(|_| scene.create_cube().index())
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert_eq!(scene.objects().len(), 5);
    }

    #[test]
    fn test_mixed_factories_share_one_counter() {
        let mut scene = Scene::new(None);
        let cube = scene.create_cube();
        let sphere = scene.create_sphere();
        let plane = scene.create_plane();
        let empty = scene.create_empty();
        let loader = scene.load_object("props.blend");
        let instance = loader.create_instance(&mut scene, None);

        assert_eq!(cube.index(), 1);
        assert_eq!(sphere.index(), 2);
        assert_eq!(plane.index(), 3);
        assert_eq!(empty.index(), 4);
        assert_eq!(instance.index(), 5);
        assert_eq!(instance.name(), "props");
    }

    #[test]
    fn test_camera_does_not_consume_identity_indices() {
        let mut scene = Scene::new(None);
        assert_eq!(scene.camera().index(), 0);
        assert_eq!(scene.create_cube().index(), 1);
    }

    #[test]
    fn test_scene_tag_merging() {
        let mut scene = Scene::new(None);
        scene.set_tags(["outdoor", "train"]).add_tags("val");
        assert_eq!(
            scene.tags().iter().cloned().collect::<Vec<_>>(),
            vec!["outdoor".to_string(), "train".to_string(), "val".to_string()]
        );
    }

    #[test]
    fn test_finalize_pushes_identity_indices_to_engine() {
        use crate::engine::HeadlessEngine;

        let mut scene = Scene::new(None);
        scene.set_resolution(320, 240).set_passes([RenderPass::Z]);
        let cube = scene.create_cube();
        let sphere = scene.create_sphere();

        let mut engine = HeadlessEngine::new();
        scene.finalize(&mut engine).unwrap();

        // The index pushed per object is the segmentation label, so it must
        // equal the handle's identity index exactly
        for handle in [&cube, &sphere] {
            let recorded = engine
                .objects()
                .find(|(_, o)| o.name == handle.name())
                .map(|(_, o)| o.pass_index)
                .unwrap();
            assert_eq!(recorded, handle.index());
        }

        assert_eq!(engine.resolution(), (320, 240));
        assert!(engine.enabled_toggles().contains("use_pass_z"));
        assert!(engine.enabled_toggles().contains("use_pass_object_index"));
        assert!(engine.compositor().is_some());
        let (_, fov) = engine.active_camera().unwrap();
        assert_eq!(fov, DEFAULT_FOV_DEGREES);
        // No output dir, so no run dir either
        assert!(scene.run_dir().is_none());
    }

    #[test]
    fn test_skipped_passes_get_no_output_slots() {
        use crate::engine::HeadlessEngine;
        use crate::render::compositor::CompositorNode;

        // Engine build without the shadow-catcher toggle
        let mut engine =
            HeadlessEngine::with_supported_toggles(&["use_pass_z", "use_pass_object_index"]);
        let mut scene = Scene::new(None);
        scene.set_passes([RenderPass::Z, RenderPass::ShadowCatcher]);
        scene.create_cube();
        scene.finalize(&mut engine).unwrap();

        let graph = engine.compositor().unwrap();
        for node in graph.nodes() {
            if let CompositorNode::FileOutput { slots, .. } = &node.kind {
                assert!(!slots.iter().any(|s| s.contains("Shadow Catcher")));
            }
        }
        assert!(!graph
            .links()
            .iter()
            .any(|l| l.from_port == "Shadow Catcher"));

        // The supported passes still made it through
        let source = graph
            .find(|k| matches!(k, CompositorNode::RenderLayers { .. }))
            .unwrap();
        let ports: Vec<&str> = graph
            .links_from(source)
            .iter()
            .map(|l| l.from_port.as_str())
            .collect();
        assert!(ports.contains(&"Depth"));
        assert!(ports.contains(&"IndexOB"));
    }

    #[test]
    fn test_set_world_replaces_variant() {
        let mut scene = Scene::new(None);
        assert!(matches!(scene.world(), World::Sky(_)));
        scene.set_world(World::hdri("studio.exr"));
        assert!(matches!(scene.world(), World::Hdri(_)));
    }
}
