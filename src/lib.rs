// src/lib.rs
//! Terragraph
//!
//! Interactive 3D viewer for infrastructure-as-code resource graphs, built on
//! wgpu and winit. Resources become icon-textured cubes, dependencies become
//! arrows, and any node can be picked up and carried around with the camera.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod graph;
pub mod input;
pub mod session;
pub mod theme;

// Re-export main types for convenience
pub use app::GraphApp;
pub use config::SceneConfig;
pub use error::{AssetLoadError, GraphError, ThemeError};
pub use gfx::scene::Scene;
pub use graph::{Graph, GraphBuilder, NodeId, ResourceDescriptor};
pub use input::InputEvent;
pub use session::SceneSession;
pub use theme::SceneTheme;
