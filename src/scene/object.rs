//! # Object Model
//!
//! [`Object`] is the handle scripts use to place and describe an entity.
//! Handles are cheap clones over shared state so a script can keep several
//! alive at once (e.g. point the camera at an empty created earlier); every
//! builder method takes `&self` and returns `&Self` for chaining.
//!
//! Each object carries an identity index assigned at registration. The
//! index is what the object-index render buffer stores per pixel, so it is
//! the segmentation label of the object and must never diverge from the
//! value pushed to the engine.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::path::PathBuf;
use std::rc::Rc;

use cgmath::{Deg, Euler, InnerSpace, Matrix3, One, Quaternion, Rotation3, Vector3, Zero};
use serde_json::Value;

use crate::engine::{Primitive, Shading, Transform};
use crate::scene::tags::IntoTags;

/// Default camera field of view in degrees (50mm lens equivalent).
pub const DEFAULT_FOV_DEGREES: f32 = 39.6;

/// Where an object's geometry comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ObjectSource {
    Primitive(Primitive),
    Asset {
        path: PathBuf,
        object_name: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct ObjectData {
    pub name: String,
    pub index: u32,
    pub source: ObjectSource,
    pub location: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    pub shading: Shading,
    pub tags: BTreeSet<String>,
    pub properties: BTreeMap<String, Value>,
    pub custom_meta: BTreeMap<String, Value>,
    pub fov_degrees: Option<f32>,
    pub show_axes: bool,
    pub show_name: bool,
}

impl ObjectData {
    pub(crate) fn new(name: &str, source: ObjectSource) -> Self {
        Self {
            name: name.to_string(),
            index: 0,
            source,
            location: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            shading: Shading::Flat,
            tags: BTreeSet::new(),
            properties: BTreeMap::new(),
            custom_meta: BTreeMap::new(),
            fov_degrees: None,
            show_axes: false,
            show_name: false,
        }
    }
}

/// Scale argument accepting a uniform scalar or three components.
pub trait IntoScale {
    fn into_scale(self) -> Vector3<f32>;
}

impl IntoScale for f32 {
    fn into_scale(self) -> Vector3<f32> {
        Vector3::new(self, self, self)
    }
}

impl IntoScale for Vector3<f32> {
    fn into_scale(self) -> Vector3<f32> {
        self
    }
}

impl IntoScale for [f32; 3] {
    fn into_scale(self) -> Vector3<f32> {
        self.into()
    }
}

impl IntoScale for (f32, f32, f32) {
    fn into_scale(self) -> Vector3<f32> {
        self.into()
    }
}

/// Validate a dynamically sized scale value (1 or 3 components).
///
/// Typed callers use [`IntoScale`]; this is the checked path for values
/// coming out of config files or other untyped sources.
pub fn scale_from_slice(values: &[f32]) -> crate::Result<Vector3<f32>> {
    match values {
        [s] => Ok(Vector3::new(*s, *s, *s)),
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        other => Err(crate::Error::InvalidScale(other.len())),
    }
}

/// A placed entity: transform, tags, properties, and an identity index.
#[derive(Debug, Clone)]
pub struct Object {
    data: Rc<RefCell<ObjectData>>,
}

impl Object {
    pub(crate) fn from_data(data: ObjectData) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
        }
    }

    pub(crate) fn data(&self) -> Ref<'_, ObjectData> {
        self.data.borrow()
    }

    /// Identity index assigned at registration; equals the per-pixel value
    /// in the object-index buffer.
    pub fn index(&self) -> u32 {
        self.data.borrow().index
    }

    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    pub fn location(&self) -> Vector3<f32> {
        self.data.borrow().location
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        self.data.borrow().rotation
    }

    /// Rotation converted to Euler angles in radians, for readability in
    /// exported metadata.
    pub fn rotation_euler(&self) -> [f32; 3] {
        let euler = Euler::from(self.data.borrow().rotation);
        [euler.x.0, euler.y.0, euler.z.0]
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.data.borrow().scale
    }

    pub fn shading(&self) -> Shading {
        self.data.borrow().shading
    }

    pub fn tags(&self) -> BTreeSet<String> {
        self.data.borrow().tags.clone()
    }

    pub fn properties(&self) -> BTreeMap<String, Value> {
        self.data.borrow().properties.clone()
    }

    pub fn custom_meta(&self) -> BTreeMap<String, Value> {
        self.data.borrow().custom_meta.clone()
    }

    pub fn transform(&self) -> Transform {
        let data = self.data.borrow();
        Transform {
            location: data.location,
            rotation: data.rotation,
            scale: data.scale,
        }
    }

    /// Rename the object. The name is only used for engine-side display and
    /// metadata; identity is the index.
    pub fn set_name(&self, name: &str) -> &Self {
        self.data.borrow_mut().name = name.to_string();
        self
    }

    /// Set the location of the object in 3D space.
    pub fn set_location(&self, location: impl Into<Vector3<f32>>) -> &Self {
        self.data.borrow_mut().location = location.into();
        self
    }

    /// Set the rotation. Accepts a quaternion or cgmath Euler angles.
    pub fn set_rotation(&self, rotation: impl Into<Quaternion<f32>>) -> &Self {
        self.data.borrow_mut().rotation = rotation.into();
        self
    }

    /// Set the scale, uniformly from a scalar or per-axis from three
    /// components.
    pub fn set_scale(&self, scale: impl IntoScale) -> &Self {
        self.data.borrow_mut().scale = scale.into_scale();
        self
    }

    /// Set a custom property. Properties are pushed onto the engine object
    /// (usable inside material node setups) and exported in metadata.
    pub fn set_property(&self, key: &str, value: impl Into<Value>) -> &Self {
        self.data
            .borrow_mut()
            .properties
            .insert(key.to_string(), value.into());
        self
    }

    /// Replace the object's tags.
    ///
    /// Tags represent the object class for training a computer vision
    /// model. An object can have more than one tag.
    pub fn set_tags(&self, tags: impl IntoTags) -> &Self {
        self.data.borrow_mut().tags = tags.into_tags();
        self
    }

    /// Add tags to the object, keeping existing ones.
    pub fn add_tags(&self, tags: impl IntoTags) -> &Self {
        self.data.borrow_mut().tags.extend(tags.into_tags());
        self
    }

    /// Attach custom metadata exported in the sidecar document but not
    /// otherwise used by the framework.
    pub fn set_custom_meta(&self, key: &str, value: impl Into<Value>) -> &Self {
        self.data
            .borrow_mut()
            .custom_meta
            .insert(key.to_string(), value.into());
        self
    }

    /// Orient the object so its forward (-Z) axis points at another object,
    /// with an optional roll around the direction vector in degrees.
    ///
    /// A zero-length direction (targets sharing a location) is a warned
    /// no-op.
    pub fn point_at(&self, target: &Object, roll_degrees: f32) -> &Self {
        let direction = target.location() - self.location();
        if direction.magnitude2() <= f32::EPSILON {
            log::warn!(
                "point_at: `{}` and `{}` share a location, orientation unchanged",
                self.name(),
                target.name()
            );
            return self;
        }

        let mut rotation = track_quaternion(direction);
        if roll_degrees != 0.0 {
            let roll = Quaternion::from_axis_angle(direction.normalize(), Deg(roll_degrees));
            rotation = roll * rotation;
        }
        self.data.borrow_mut().rotation = rotation;
        self
    }

    /// Rotate the object around a world-space axis by an angle in degrees
    /// (pre-rotation on top of the current orientation).
    ///
    /// A zero-length axis is a warned no-op.
    pub fn rotate_around_axis(&self, axis: Vector3<f32>, angle_degrees: f32) -> &Self {
        if axis.magnitude2() <= f32::EPSILON {
            log::warn!(
                "rotate_around_axis: zero-length axis on `{}`, orientation unchanged",
                self.name()
            );
            return self;
        }

        let rot = Quaternion::from_axis_angle(axis.normalize(), Deg(angle_degrees));
        let mut data = self.data.borrow_mut();
        data.rotation = rot * data.rotation;
        drop(data);
        self
    }

    /// Set surface shading to flat or smooth.
    pub fn set_shading(&self, shading: Shading) -> &Self {
        self.data.borrow_mut().shading = shading;
        self
    }

    /// Show debug axes in the interactive preview.
    pub fn show_debug_axes(&self, show: bool) -> &Self {
        self.data.borrow_mut().show_axes = show;
        self
    }

    /// Show the object's name in the interactive preview.
    pub fn show_debug_name(&self, show: bool) -> &Self {
        self.data.borrow_mut().show_name = show;
        self
    }
}

/// The render camera: an [`Object`] with a field of view.
///
/// Exactly one camera is active per scene; it is created automatically at
/// scene construction.
#[derive(Debug, Clone)]
pub struct Camera {
    object: Object,
}

impl Camera {
    pub(crate) fn from_object(object: Object) -> Self {
        Self { object }
    }

    /// Set the field of view in degrees.
    pub fn set_fov(&self, degrees: f32) -> &Self {
        self.object.data.borrow_mut().fov_degrees = Some(degrees);
        self
    }

    pub fn fov_degrees(&self) -> f32 {
        self.object
            .data
            .borrow()
            .fov_degrees
            .unwrap_or(DEFAULT_FOV_DEGREES)
    }

    pub fn object(&self) -> &Object {
        &self.object
    }
}

impl Deref for Camera {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.object
    }
}

/// Quaternion orienting local -Z along `direction` with the up axis
/// resolved toward world +Z (falling back to world +Y when the direction is
/// vertical).
fn track_quaternion(direction: Vector3<f32>) -> Quaternion<f32> {
    let z_axis = -direction.normalize();

    let vertical = z_axis.x.abs() <= f32::EPSILON && z_axis.y.abs() <= f32::EPSILON;
    let up_ref = if vertical {
        Vector3::unit_y()
    } else {
        Vector3::unit_z()
    };

    let x_axis = up_ref.cross(z_axis).normalize();
    let y_axis = z_axis.cross(x_axis);
    Quaternion::from(Matrix3::from_cols(x_axis, y_axis, z_axis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Rotation;

    fn test_object(name: &str) -> Object {
        Object::from_data(ObjectData::new(
            name,
            ObjectSource::Primitive(Primitive::Cube { size: 2.0 }),
        ))
    }

    #[test]
    fn test_builder_chaining() {
        let cube = test_object("Cube");
        cube.set_location((1.0, 0.0, 0.5))
            .set_scale(0.5)
            .set_tags("cube")
            .set_property("roughness", 0.25)
            .set_custom_meta("variant", "shiny");

        assert_eq!(cube.location(), Vector3::new(1.0, 0.0, 0.5));
        assert_eq!(cube.scale(), Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(cube.tags(), BTreeSet::from(["cube".to_string()]));
        assert_eq!(cube.properties()["roughness"], Value::from(0.25));
        assert_eq!(cube.custom_meta()["variant"], Value::from("shiny"));
    }

    #[test]
    fn test_scale_accepts_scalar_and_components() {
        let obj = test_object("Obj");
        obj.set_scale([1.0, 2.0, 3.0]);
        assert_eq!(obj.scale(), Vector3::new(1.0, 2.0, 3.0));

        assert_eq!(scale_from_slice(&[2.0]).unwrap(), Vector3::new(2.0, 2.0, 2.0));
        assert!(matches!(
            scale_from_slice(&[1.0, 2.0]),
            Err(crate::Error::InvalidScale(2))
        ));
    }

    #[test]
    fn test_point_at_straight_down_is_identity() {
        // Forward is -Z, so looking from origin toward (0, 0, -1) needs no
        // rotation at all
        let eye = test_object("Eye");
        let target = test_object("Target").set_location((0.0, 0.0, -1.0)).clone();
        eye.point_at(&target, 0.0);

        let q = eye.rotation();
        assert_relative_eq!(q.s, 1.0, epsilon = 1e-6);
        assert_relative_eq!(q.v.magnitude(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_point_at_aligns_forward_axis() {
        let eye = test_object("Eye").set_location((7.0, 7.0, 3.0)).clone();
        let target = test_object("Target").set_location((0.0, 0.0, 1.0)).clone();
        eye.point_at(&target, 0.0);

        let forward = eye.rotation().rotate_vector(-Vector3::unit_z());
        let expected = (target.location() - eye.location()).normalize();
        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(forward.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn test_point_at_roll_rotates_around_direction() {
        let target = test_object("Target").set_location((0.0, 5.0, 0.0)).clone();

        let plain = test_object("A");
        plain.point_at(&target, 0.0);
        let rolled = test_object("B");
        rolled.point_at(&target, 90.0);

        // Forward axis is unaffected by roll
        let dir = Vector3::unit_y();
        let fwd_plain = plain.rotation().rotate_vector(-Vector3::unit_z());
        let fwd_rolled = rolled.rotation().rotate_vector(-Vector3::unit_z());
        assert_relative_eq!(fwd_plain.dot(dir), 1.0, epsilon = 1e-5);
        assert_relative_eq!(fwd_rolled.dot(dir), 1.0, epsilon = 1e-5);

        // Up axes differ by exactly 90 degrees about the direction
        let up_plain = plain.rotation().rotate_vector(Vector3::unit_y());
        let up_rolled = rolled.rotation().rotate_vector(Vector3::unit_y());
        assert_relative_eq!(up_plain.dot(up_rolled), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_point_at_zero_direction_is_noop() {
        let a = test_object("A").set_rotation(Quaternion::one()).clone();
        let b = test_object("B");
        a.point_at(&b, 0.0);
        assert_eq!(a.rotation(), Quaternion::one());
    }

    #[test]
    fn test_rotate_around_axis_is_world_space_prerotation() {
        let obj = test_object("Obj");
        obj.rotate_around_axis(Vector3::unit_z(), 90.0);
        obj.rotate_around_axis(Vector3::unit_z(), 90.0);

        // Two quarter turns about Z send +X to -X
        let x = obj.rotation().rotate_vector(Vector3::unit_x());
        assert_relative_eq!(x.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(x.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotate_around_zero_axis_is_noop() {
        let obj = test_object("Obj");
        obj.rotate_around_axis(Vector3::zero(), 90.0);
        assert_eq!(obj.rotation(), Quaternion::one());
    }

    #[test]
    fn test_camera_fov_default_and_override() {
        let camera = Camera::from_object(test_object("Camera"));
        assert_relative_eq!(camera.fov_degrees(), DEFAULT_FOV_DEGREES);
        camera.set_fov(60.0);
        assert_relative_eq!(camera.fov_degrees(), 60.0);

        // Object builder methods are reachable through the camera
        camera.set_location((0.0, 0.0, 10.0));
        assert_eq!(camera.location(), Vector3::new(0.0, 0.0, 10.0));
    }
}
