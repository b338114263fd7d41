//! # Pick-and-Drag
//!
//! A press casts the forward ray; the nearest node it hits is moved into
//! viewpoint space so it travels rigidly with the camera. A release moves it
//! back into world space wherever the camera left it.
//!
//! ```text
//!            press (hit)
//!   Idle ───────────────────▶ Dragging
//!    ▲  press (miss): no-op      │  press: ignored
//!    └───────────────────────────┘
//!               release
//! ```
//!
//! Only one node can be dragged at a time. A second press while dragging is
//! ignored rather than switching the selection.

use cgmath::{Matrix4, SquareMatrix};

use super::NodePicker;
use crate::gfx::{scene::Scene, transform::change_coordinate_space};
use crate::graph::{NodeId, Parent};

/// The dragged node and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub node: NodeId,
    pub prior_parent: Option<Parent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Selection),
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    picker: NodePicker,
}

impl DragController {
    /// Creates an idle controller for cubes with edge length `node_size`
    pub fn new(node_size: f32) -> Self {
        Self {
            state: DragState::Idle,
            picker: NodePicker::new(node_size),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn selected(&self) -> Option<NodeId> {
        match self.state {
            DragState::Dragging(selection) => Some(selection.node),
            DragState::Idle => None,
        }
    }

    /// Handles a primary press. Returns the node picked up, if any.
    pub fn press(&mut self, scene: &mut Scene) -> Option<NodeId> {
        if let DragState::Dragging(selection) = self.state {
            log::debug!("Ignoring press while dragging {:?}", selection.node);
            return None;
        }

        let ray = scene.viewpoint.forward_ray();
        let hit = self.picker.pick(&ray, scene.pick_candidates())?;
        let id = hit.node;

        let node = scene.graph.node(id)?;
        let prior_parent = node.parent();
        let local = node.transform;

        let from_space = scene.parent_world_matrix(prior_parent);
        let to_space = scene.viewpoint.world_matrix();
        let Some(in_viewpoint) = change_coordinate_space(&local, &from_space, &to_space) else {
            log::warn!("Viewpoint transform is singular, cannot pick up {:?}", id);
            return None;
        };

        scene.detach_from_parent(id);
        if let Some(node) = scene.graph.node_mut(id) {
            node.transform = in_viewpoint;
        }
        scene.attach_to_viewpoint(id);

        self.state = DragState::Dragging(Selection {
            node: id,
            prior_parent,
        });
        log::debug!(
            "Picked up {:?} at distance {:.2}",
            scene.graph.node(id).map(|n| n.name.as_str()).unwrap_or_default(),
            hit.distance
        );

        Some(id)
    }

    /// Handles a primary release. Returns the node put down, if any.
    pub fn release(&mut self, scene: &mut Scene) -> Option<NodeId> {
        let DragState::Dragging(selection) = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        let id = selection.node;

        // The scene may have been reloaded since the press
        let viewpoint_world = scene.viewpoint.world_matrix();
        let Some(node) = scene
            .graph
            .node_mut(id)
            .filter(|node| node.parent() == Some(Parent::Viewpoint))
        else {
            log::debug!("Dropping stale selection {:?}", id);
            return None;
        };
        if let Some(in_world) =
            change_coordinate_space(&node.transform, &viewpoint_world, &Matrix4::identity())
        {
            node.transform = in_world;
        }

        scene.detach_from_parent(id);
        scene.add_node(id);
        if let Some(parent) = selection.prior_parent {
            scene.insert_into(id, parent);
        }
        scene.refresh_arrows(id);

        log::debug!("Released {:?}", id);
        Some(id)
    }

    /// Forgets the selection without touching the scene
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    /// Keeps the dragged node's arrows attached to it. Call once per frame.
    pub fn update_selected_arrows(&self, scene: &mut Scene) {
        if let Some(id) = self.selected() {
            scene.refresh_arrows(id);
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(1.0)
    }
}
