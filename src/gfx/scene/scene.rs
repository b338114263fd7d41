use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::{
    config::SceneConfig,
    gfx::{
        camera::Viewpoint,
        geometry::{generate_cube, GeometryData},
        instances::{ArrowInstance, NodeInstance},
        transform::transform_point,
    },
    graph::{ArrowGeometry, Graph, NodeId, Parent},
    theme::{rgb_f32, SceneTheme},
};

/// Main scene containing the graph, viewpoint and theme
pub struct Scene {
    pub graph: Graph,
    pub viewpoint: Viewpoint,
    pub theme: SceneTheme,
    root: Vec<NodeId>,
    viewpoint_anchored: bool,
    cone_length: f32,
    node_mesh: GeometryData,
}

impl Scene {
    /// Creates an empty scene with the viewpoint at `config.camera_start`
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            graph: Graph::new(),
            viewpoint: Viewpoint::new(Vector3::from(config.camera_start)),
            theme: SceneTheme::default(),
            root: Vec::new(),
            viewpoint_anchored: false,
            cone_length: config.cone_length,
            node_mesh: generate_cube(config.node_size),
        }
    }

    /// Replaces the current graph and puts every node under the world root
    pub fn insert_graph(&mut self, graph: Graph) {
        for id in self.viewpoint.attached().to_vec() {
            self.viewpoint.detach(id);
        }
        self.root.clear();
        self.graph = graph;

        let ids: Vec<NodeId> = self.graph.nodes().map(|(id, _)| id).collect();
        for id in ids {
            self.add_node(id);
        }
    }

    /// Adds `id` to the world root. Adding twice is a no-op.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.graph.node(id).is_none() || self.root.contains(&id) {
            return false;
        }
        if let Some(node) = self.graph.node_mut(id) {
            node.parent = Some(Parent::World);
        }
        self.root.push(id);
        true
    }

    /// Removes `id` from the world root
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.root.len();
        self.root.retain(|&n| n != id);
        if self.root.len() == before {
            return false;
        }
        if let Some(node) = self.graph.node_mut(id) {
            node.parent = None;
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.root.contains(&id)
    }

    pub fn root_nodes(&self) -> &[NodeId] {
        &self.root
    }

    pub(crate) fn attach_to_viewpoint(&mut self, id: NodeId) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.parent = Some(Parent::Viewpoint);
        self.viewpoint.attach(id)
    }

    /// Takes `id` out of whichever container holds it
    pub(crate) fn detach_from_parent(&mut self, id: NodeId) {
        match self.graph.node(id).and_then(|node| node.parent()) {
            Some(Parent::World) => {
                self.remove_node(id);
            }
            Some(Parent::Viewpoint) => {
                self.viewpoint.detach(id);
                if let Some(node) = self.graph.node_mut(id) {
                    node.parent = None;
                }
            }
            None => {}
        }
    }

    pub(crate) fn insert_into(&mut self, id: NodeId, parent: Parent) {
        match parent {
            Parent::World => {
                self.add_node(id);
            }
            Parent::Viewpoint => {
                self.attach_to_viewpoint(id);
            }
        }
    }

    /// Marks the viewpoint as part of the scene so its reticle is drawn
    pub fn add_viewpoint_anchor(&mut self) {
        self.viewpoint_anchored = true;
    }

    pub fn viewpoint_anchored(&self) -> bool {
        self.viewpoint_anchored
    }

    /// World matrix of a container; detached nodes count as world space
    pub fn parent_world_matrix(&self, parent: Option<Parent>) -> Matrix4<f32> {
        match parent {
            Some(Parent::Viewpoint) => self.viewpoint.world_matrix(),
            Some(Parent::World) | None => Matrix4::identity(),
        }
    }

    pub fn node_world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.graph.node(id)?;
        Some(self.parent_world_matrix(node.parent()) * node.transform.to_matrix())
    }

    pub fn node_world_position(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.node_world_matrix(id)
            .map(|world| transform_point(&world, Vector3::new(0.0, 0.0, 0.0)))
    }

    /// Every node with its world matrix, for hit testing
    pub fn pick_candidates(&self) -> Vec<(NodeId, Matrix4<f32>)> {
        self.graph
            .nodes()
            .filter_map(|(id, _)| self.node_world_matrix(id).map(|world| (id, world)))
            .collect()
    }

    /// Recomputes every arrow touching `id` from current world positions
    pub fn refresh_arrows(&mut self, id: NodeId) {
        let updates: Vec<_> = self
            .graph
            .incident_arrows(id)
            .into_iter()
            .filter_map(|arrow_id| {
                let arrow = self.graph.arrow(arrow_id)?;
                let tail = self.node_world_position(arrow.tail)?;
                let head = self.node_world_position(arrow.head)?;
                Some((arrow_id, ArrowGeometry::between(tail, head, self.cone_length)))
            })
            .collect();

        for (arrow_id, geometry) in updates {
            if let Some(arrow) = self.graph.arrow_mut(arrow_id) {
                arrow.geometry = geometry;
            }
        }
    }

    /// Shared cube mesh every node instance is drawn with
    pub fn node_mesh(&self) -> &GeometryData {
        &self.node_mesh
    }

    /// Instances for nodes in the world root and on the viewpoint
    pub fn node_instances(&self, selected: Option<NodeId>) -> Vec<NodeInstance> {
        self.root
            .iter()
            .chain(self.viewpoint.attached())
            .filter_map(|&id| {
                self.node_world_matrix(id)
                    .map(|world| NodeInstance::new(world, selected == Some(id)))
            })
            .collect()
    }

    pub fn arrow_instances(&self) -> Vec<ArrowInstance> {
        self.graph
            .arrows()
            .map(|(_, arrow)| ArrowInstance::new(&arrow.geometry, rgb_f32(arrow.color)))
            .collect()
    }

    /// Number of nodes in the world root
    pub fn get_object_count(&self) -> usize {
        self.root.len()
    }

    /// Names of all nodes, for UI display
    pub fn get_object_names(&self) -> Vec<String> {
        self.graph.nodes().map(|(_, node)| node.name.clone()).collect()
    }
}
