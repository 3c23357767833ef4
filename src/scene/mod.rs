//! # Scene Description
//!
//! The declarative data model user scripts build up: the scene itself
//! (entity registry, camera, world, render settings), placed objects, and
//! environment lighting.

pub mod object;
pub mod scene;
pub mod tags;
pub mod world;

pub use object::{Camera, IntoScale, Object, DEFAULT_FOV_DEGREES};
pub use scene::{ObjectLoader, Scene};
pub use tags::IntoTags;
pub use world::{
    ColorParams, ColorWorld, HdriParams, HdriWorld, ImportedWorld, ShaderNode, SkyParams,
    SkyWorld, World, WorldGraph,
};
