//! # Render Configuration
//!
//! Turns the declarative scene description into host-engine render state:
//! which passes the renderer computes and how the compositor splits the
//! resulting buffers into output files.

pub mod compositor;
pub mod passes;
