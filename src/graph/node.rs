//! Graph nodes: one textured cube per infrastructure resource.

use cgmath::Vector3;

use super::arrow::ArrowId;
use crate::gfx::{resources::IconTexture, transform::Transform};

/// Index of a node in its owning [`Graph`](super::Graph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Container a node's local transform is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// The scene's render root; local space is world space
    World,
    /// Rigidly attached to the viewpoint during a drag
    Viewpoint,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// `_gvid` for graph-form input, document index for coordinate-form input
    pub resource_id: u64,
    /// Normalized resource address
    pub name: String,
    /// Icon path, empty when the resource has no icon
    pub icon_path: String,
    /// `None` when the icon was empty or failed to load
    pub texture: Option<IconTexture>,
    pub transform: Transform,
    pub(crate) parent: Option<Parent>,
    edges_in: Vec<NodeId>,
    edges_out: Vec<NodeId>,
    arrows_in: Vec<ArrowId>,
    arrows_out: Vec<ArrowId>,
}

impl Node {
    pub fn new(
        resource_id: u64,
        name: impl Into<String>,
        icon_path: impl Into<String>,
        texture: Option<IconTexture>,
        position: Vector3<f32>,
    ) -> Self {
        Self {
            resource_id,
            name: name.into(),
            icon_path: icon_path.into(),
            texture,
            transform: Transform::from_position(position),
            parent: None,
            edges_in: Vec::new(),
            edges_out: Vec::new(),
            arrows_in: Vec::new(),
            arrows_out: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    /// Nodes with an edge pointing at this one, in discovery order
    pub fn edges_in(&self) -> &[NodeId] {
        &self.edges_in
    }

    /// Nodes this one points at, in discovery order
    pub fn edges_out(&self) -> &[NodeId] {
        &self.edges_out
    }

    pub fn arrows_in(&self) -> &[ArrowId] {
        &self.arrows_in
    }

    pub fn arrows_out(&self) -> &[ArrowId] {
        &self.arrows_out
    }

    pub(crate) fn push_out(&mut self, head: NodeId, arrow: ArrowId) {
        self.edges_out.push(head);
        self.arrows_out.push(arrow);
    }

    pub(crate) fn push_in(&mut self, tail: NodeId, arrow: ArrowId) {
        self.edges_in.push(tail);
        self.arrows_in.push(arrow);
    }
}
