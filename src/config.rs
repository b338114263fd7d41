//! Scene configuration.
//!
//! Every knob has a default matching the stock viewer; partial JSON documents
//! override only the fields they name.

use serde::Deserialize;

/// Tunables for graph layout, arrows, picking and movement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Prefix prepended to every resolved icon sub-path
    pub icon_base_path: String,
    /// Length of the cone at the head of each arrow
    pub cone_length: f32,
    /// 24-bit RGB color of newly created arrows
    pub arrow_color: u32,
    /// Side length of the cube that randomly placed nodes are scattered in
    pub scatter_extent: f32,
    /// Multiplier from descriptor coordinates to world units
    pub coordinate_scale: f32,
    /// Vertical offset added to coordinate-placed nodes
    pub coordinate_height: f32,
    /// Edge length of the node cube, used for picking bounds
    pub node_size: f32,
    /// Per-frame movement is the unit direction divided by this
    pub move_speed_divisor: f32,
    /// Radians of yaw/pitch per pixel of pointer motion
    pub look_sensitivity: f32,
    /// Initial viewpoint position
    pub camera_start: [f32; 3],
    /// Seed for random placement. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            icon_base_path: "img/gcp_icons/".to_string(),
            cone_length: 0.5,
            arrow_color: 0xff0000,
            scatter_extent: 10.0,
            coordinate_scale: 0.05,
            coordinate_height: 1.0,
            node_size: 1.0,
            move_speed_divisor: 10.0,
            look_sensitivity: 0.002,
            camera_start: [0.0, 0.0, 5.0],
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Parses a (possibly partial) JSON config document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_icon_base_path(mut self, base: impl Into<String>) -> Self {
        self.icon_base_path = base.into();
        self
    }
}
