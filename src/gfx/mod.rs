//! # Graphics Module
//!
//! Everything between the resource graph and the pixels: the viewpoint and
//! its controls, node picking and dragging, the scene render root and the
//! GPU-ready instance data it produces.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Viewpoint plus desktop or headset controls
//! - **Picking** ([`picking`]) - Ray/AABB hit tests and the drag state machine
//! - **Scene Management** ([`scene`]) - Render root, viewpoint container, arrows
//! - **Resource Management** ([`resources`]) - Icon textures and their loaders
//! - **Instances** ([`instances`]) - `bytemuck` instance records with `wgpu` layouts
//! - **Rendering** ([`rendering`]) - Instanced forward renderer for nodes, arrows and the reticle
//!
//! ## Usage
//!
//! ```no_run
//! use terragraph::gfx::{scene::Scene, DragController};
//! use terragraph::SceneConfig;
//!
//! let mut scene = Scene::new(&SceneConfig::default());
//! let mut drag = DragController::default();
//! if let Some(node) = drag.press(&mut scene) {
//!     println!("dragging {:?}", node);
//! }
//! drag.release(&mut scene);
//! ```

pub mod camera;
pub mod geometry;
pub mod instances;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod transform;

pub use camera::{Controls, Viewpoint};
pub use instances::{ArrowInstance, NodeInstance};
pub use picking::{DragController, DragState, NodePicker, Selection};
pub use rendering::RenderEngine;
pub use scene::Scene;
pub use transform::{change_coordinate_space, Transform};
