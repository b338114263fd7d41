//! # Resource Graph
//!
//! Nodes and arrows built from a resource descriptor. The [`Graph`] is an
//! arena: it owns every [`Node`] and [`Arrow`], and they refer to each other
//! by [`NodeId`] / [`ArrowId`].
//!
//! ## Key Components
//!
//! - [`icons`] - resource name to icon path
//! - [`descriptor`] - the two accepted input shapes and their normalization
//! - [`builder`] - async construction, one texture load per node
//!
//! ## Usage
//!
//! ```no_run
//! use terragraph::graph::{builder::GraphBuilder, descriptor::ResourceDescriptor};
//! use terragraph::gfx::resources::FileTextureLoader;
//! use terragraph::SceneConfig;
//!
//! # async fn run() -> Result<(), terragraph::GraphError> {
//! let descriptor = ResourceDescriptor::from_path("graph.json")?;
//! let config = SceneConfig::default();
//! let loader = FileTextureLoader::new(".");
//! let graph = GraphBuilder::new(&config, &loader).build(&descriptor).await?;
//! println!("{} nodes", graph.node_count());
//! # Ok(())
//! # }
//! ```

pub mod arrow;
pub mod builder;
pub mod descriptor;
pub mod icons;
pub mod node;

use std::collections::HashMap;

pub use arrow::{Arrow, ArrowGeometry, ArrowId};
pub use builder::GraphBuilder;
pub use descriptor::{ResourceDescriptor, ResourceKey, ResourceLayout};
pub use icons::IconResolver;
pub use node::{Node, NodeId, Parent};

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    arrows: Vec<Arrow>,
    by_id: HashMap<u64, NodeId>,
    by_name: HashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `node` and registers it under its resource id and name.
    ///
    /// When two nodes share a name, lookups by name find the first one.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_id.entry(node.resource_id).or_insert(id);
        if !node.name.is_empty() {
            if let Some(existing) = self.by_name.get(&node.name) {
                log::debug!(
                    "Resource name '{}' already registered as {:?}",
                    node.name,
                    existing
                );
            } else {
                self.by_name.insert(node.name.clone(), id);
            }
        }
        self.nodes.push(node);
        id
    }

    /// Wires a directed edge and its arrow.
    ///
    /// # Panics
    /// If either id does not belong to this graph.
    pub fn connect(
        &mut self,
        tail: NodeId,
        head: NodeId,
        color: u32,
        geometry: ArrowGeometry,
    ) -> ArrowId {
        assert!(tail.0 < self.nodes.len() && head.0 < self.nodes.len());

        let arrow = ArrowId(self.arrows.len());
        self.arrows.push(Arrow {
            tail,
            head,
            color,
            geometry,
        });
        self.nodes[tail.0].push_out(head, arrow);
        self.nodes[head.0].push_in(tail, arrow);
        arrow
    }

    pub fn find(&self, key: &ResourceKey) -> Option<NodeId> {
        match key {
            ResourceKey::Id(id) => self.by_id.get(id).copied(),
            ResourceKey::Name(name) => self.by_name.get(name).copied(),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arrow(&self, id: ArrowId) -> Option<&Arrow> {
        self.arrows.get(id.0)
    }

    pub fn arrow_mut(&mut self, id: ArrowId) -> Option<&mut Arrow> {
        self.arrows.get_mut(id.0)
    }

    pub fn arrows(&self) -> impl Iterator<Item = (ArrowId, &Arrow)> {
        self.arrows.iter().enumerate().map(|(i, a)| (ArrowId(i), a))
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    /// Every arrow touching `node`, outgoing first. Self-loops appear once.
    pub fn incident_arrows(&self, node: NodeId) -> Vec<ArrowId> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };

        let mut arrows: Vec<ArrowId> = node.arrows_out().to_vec();
        for arrow in node.arrows_in() {
            if !arrows.contains(arrow) {
                arrows.push(*arrow);
            }
        }
        arrows
    }
}
