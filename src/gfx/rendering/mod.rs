//! # Rendering
//!
//! A small forward renderer: one instanced draw for the node cubes, one for
//! the arrows, and a screen-space reticle on top. Nodes are flat shaded, with
//! the dragged node highlighted.

pub mod render_engine;

pub use render_engine::{ArrowVertex, CameraUniform, MeshVertex, RenderEngine};
