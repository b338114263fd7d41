//! # Graph Builder
//!
//! Turns a [`ResourceDescriptor`] into a [`Graph`]:
//!
//! 1. Normalize the descriptor into a [`ResourceLayout`]
//! 2. Create one node per resource, awaiting its icon texture
//! 3. Wire every edge once all nodes exist
//!
//! Node creation is sequential, so by the time edges are processed every
//! node an edge can name is already registered. A texture that fails to load
//! only costs that node its icon; an edge naming an unknown resource fails
//! the whole build.

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{
    arrow::ArrowGeometry,
    descriptor::{Placement, ResourceDescriptor, ResourceKey, ResourceLayout},
    icons::IconResolver,
    node::Node,
    Graph, NodeId,
};
use crate::{
    config::SceneConfig,
    error::GraphError,
    gfx::resources::{IconTexture, TextureLoader},
};

pub struct GraphBuilder<'a, L: TextureLoader + ?Sized> {
    config: &'a SceneConfig,
    loader: &'a L,
    resolver: IconResolver,
}

impl<'a, L: TextureLoader + ?Sized> GraphBuilder<'a, L> {
    pub fn new(config: &'a SceneConfig, loader: &'a L) -> Self {
        Self {
            config,
            loader,
            resolver: IconResolver::new(config.icon_base_path.clone()),
        }
    }

    /// Builds the complete graph, or fails without returning any part of it.
    pub async fn build(&self, descriptor: &ResourceDescriptor) -> Result<Graph, GraphError> {
        let layout = descriptor.normalize()?;
        self.build_layout(&layout).await
    }

    pub async fn build_layout(&self, layout: &ResourceLayout) -> Result<Graph, GraphError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut graph = Graph::new();
        let mut missing_icons = 0;

        for entry in &layout.entries {
            let icon_path = self.resolver.resolve(&entry.name);
            let texture = self.load_texture(&icon_path).await;
            if texture.is_none() && !icon_path.is_empty() {
                missing_icons += 1;
            }

            let position = self.initial_position(entry.placement, &mut rng);
            graph.add_node(Node::new(
                entry.id,
                entry.name.clone(),
                icon_path,
                texture,
                position,
            ));
        }

        for (tail_key, head_key) in &layout.edges {
            let tail = resolve_endpoint(&graph, tail_key, tail_key, head_key)?;
            let head = resolve_endpoint(&graph, head_key, tail_key, head_key)?;

            let geometry = ArrowGeometry::between(
                position_of(&graph, tail),
                position_of(&graph, head),
                self.config.cone_length,
            );
            graph.connect(tail, head, self.config.arrow_color, geometry);
        }

        log::info!(
            "Built resource graph: {} nodes, {} edges ({} icons missing)",
            graph.node_count(),
            graph.arrow_count(),
            missing_icons
        );

        Ok(graph)
    }

    async fn load_texture(&self, icon_path: &str) -> Option<IconTexture> {
        if icon_path.is_empty() {
            return None;
        }

        match self.loader.load(icon_path).await {
            Ok(texture) => Some(texture),
            Err(err) => {
                log::warn!("Continuing without icon: {}", err);
                None
            }
        }
    }

    fn initial_position(&self, placement: Placement, rng: &mut StdRng) -> Vector3<f32> {
        match placement {
            Placement::Scattered => {
                let extent = self.config.scatter_extent;
                Vector3::new(
                    rng.random::<f32>() * extent,
                    rng.random::<f32>() * extent,
                    rng.random::<f32>() * extent,
                )
            }
            Placement::Planar { x, y } => {
                let scale = self.config.coordinate_scale;
                Vector3::new(
                    x as f32 * scale,
                    y as f32 * scale + self.config.coordinate_height,
                    0.0,
                )
            }
        }
    }
}

fn resolve_endpoint(
    graph: &Graph,
    key: &ResourceKey,
    tail: &ResourceKey,
    head: &ResourceKey,
) -> Result<NodeId, GraphError> {
    graph
        .find(key)
        .ok_or_else(|| GraphError::UnresolvedEndpoint {
            tail: tail.to_string(),
            head: head.to_string(),
            missing: key.to_string(),
        })
}

fn position_of(graph: &Graph, id: NodeId) -> Vector3<f32> {
    graph
        .node(id)
        .map(|node| node.transform.position)
        .unwrap_or_else(|| Vector3::new(0.0, 0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetLoadError;
    use cgmath::InnerSpace;
    use futures::executor::block_on;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::Mutex;

    /// Serves a solid texture for every path except those containing `fail_on`.
    struct MemoryLoader {
        fail_on: Option<&'static str>,
        requests: Mutex<Vec<String>>,
    }

    impl MemoryLoader {
        fn new() -> Self {
            Self {
                fail_on: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(fragment: &'static str) -> Self {
            Self {
                fail_on: Some(fragment),
                ..Self::new()
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl TextureLoader for MemoryLoader {
        fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<IconTexture, AssetLoadError>> {
            async move {
                self.requests.lock().unwrap().push(path.to_string());
                match self.fail_on {
                    Some(fragment) if path.contains(fragment) => {
                        Err(AssetLoadError::Missing(path.to_string()))
                    }
                    _ => Ok(IconTexture::solid(path, [255, 255, 255, 255])),
                }
            }
            .boxed()
        }
    }

    const TERRAFORM_GRAPH: &str = r#"{
        "objects": [
            {"_gvid": 0, "name": "[root] root"},
            {"_gvid": 1, "name": "[root] google_compute_instance.vm_instance"},
            {"_gvid": 2, "name": "[root] google_compute_network.vpc_network"},
            {"_gvid": 3, "name": "[root] provider.google"},
            {"_gvid": 4, "name": "[root] google_project.my_project"}
        ],
        "edges": [
            {"tail": 0, "head": 1},
            {"tail": 1, "head": 2},
            {"tail": 1, "head": 3},
            {"tail": 2, "head": 3},
            {"tail": 4, "head": 3},
            {"tail": 1, "head": 2}
        ]
    }"#;

    fn build(json: &str, config: &SceneConfig, loader: &MemoryLoader) -> Result<Graph, GraphError> {
        let descriptor = ResourceDescriptor::from_json(json)?;
        block_on(GraphBuilder::new(config, loader).build(&descriptor))
    }

    fn node_named<'g>(graph: &'g Graph, name: &str) -> (NodeId, &'g Node) {
        let id = graph.find_by_name(name).unwrap();
        (id, graph.node(id).unwrap())
    }

    #[test]
    fn test_one_node_per_resource_and_paired_lists() {
        let config = SceneConfig::default().with_seed(1);
        let graph = build(TERRAFORM_GRAPH, &config, &MemoryLoader::new()).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.arrow_count(), 5);
        for (_, node) in graph.nodes() {
            assert_eq!(node.edges_out().len(), node.arrows_out().len());
            assert_eq!(node.edges_in().len(), node.arrows_in().len());
        }
    }

    #[test]
    fn test_each_edge_occurrence_is_recorded_once() {
        let config = SceneConfig::default().with_seed(1);
        let graph = build(TERRAFORM_GRAPH, &config, &MemoryLoader::new()).unwrap();

        let (vm, vm_node) = node_named(&graph, "google_compute_instance.vm_instance");
        let (net, net_node) = node_named(&graph, "google_compute_network.vpc_network");
        let (provider, provider_node) = node_named(&graph, "provider.google");

        assert_eq!(vm_node.edges_out(), &[net, provider, net]);
        assert_eq!(net_node.edges_in(), &[vm, vm]);
        assert_eq!(provider_node.edges_in().len(), 3);
        assert_eq!(
            provider_node.edges_in().iter().filter(|&&n| n == vm).count(),
            1
        );
    }

    #[test]
    fn test_arrow_geometry_follows_node_positions() {
        let config = SceneConfig::default().with_seed(3);
        let graph = build(TERRAFORM_GRAPH, &config, &MemoryLoader::new()).unwrap();

        for (_, arrow) in graph.arrows() {
            let tail = graph.node(arrow.tail).unwrap().transform.position;
            let head = graph.node(arrow.head).unwrap().transform.position;
            let distance = (head - tail).magnitude();

            assert_eq!(arrow.geometry.origin, tail);
            assert!((arrow.geometry.shaft_length - (distance - 0.5).max(0.0)).abs() < 1e-4);
            assert_eq!(arrow.geometry.cone_width, 0.25);
            assert_eq!(arrow.color, 0xff0000);
        }
    }

    #[test]
    fn test_seeded_scatter_is_deterministic_and_bounded() {
        let config = SceneConfig::default().with_seed(42);
        let first = build(TERRAFORM_GRAPH, &config, &MemoryLoader::new()).unwrap();
        let second = build(TERRAFORM_GRAPH, &config, &MemoryLoader::new()).unwrap();

        for ((_, a), (_, b)) in first.nodes().zip(second.nodes()) {
            assert_eq!(a.transform.position, b.transform.position);
            let p = a.transform.position;
            for c in [p.x, p.y, p.z] {
                assert!((0.0..10.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_coordinate_placement() {
        let config = SceneConfig::default();
        let graph = build(
            r#"{
                "google_compute_network.vpc_network": {"x": 20, "y": 40},
                "google_compute_instance.vm_instance": {"x": -20, "y": 0, "next": ["google_compute_network.vpc_network"]}
            }"#,
            &config,
            &MemoryLoader::new(),
        )
        .unwrap();

        let (net, net_node) = node_named(&graph, "google_compute_network.vpc_network");
        let (_, vm_node) = node_named(&graph, "google_compute_instance.vm_instance");

        assert!((net_node.transform.position - Vector3::new(1.0, 3.0, 0.0)).magnitude() < 1e-5);
        assert!((vm_node.transform.position - Vector3::new(-1.0, 1.0, 0.0)).magnitude() < 1e-5);
        assert_eq!(vm_node.edges_out(), &[net]);
    }

    #[test]
    fn test_unresolved_endpoint_aborts_build() {
        let config = SceneConfig::default();
        let result = build(
            r#"{"vm": {"x": 0, "y": 0, "next": ["ghost"]}}"#,
            &config,
            &MemoryLoader::new(),
        );

        match result {
            Err(GraphError::UnresolvedEndpoint { missing, .. }) => assert!(missing.contains("ghost")),
            other => panic!("expected UnresolvedEndpoint, got {:?}", other.map(|g| g.node_count())),
        }
    }

    #[test]
    fn test_unresolved_gvid_aborts_build() {
        let config = SceneConfig::default().with_seed(0);
        let result = build(
            r#"{"objects": [{"_gvid": 1, "name": "a"}], "edges": [{"tail": 1, "head": 9}]}"#,
            &config,
            &MemoryLoader::new(),
        );

        assert!(matches!(result, Err(GraphError::UnresolvedEndpoint { .. })));
    }

    #[test]
    fn test_failed_icon_keeps_node() {
        let config = SceneConfig::default().with_seed(5);
        let loader = MemoryLoader::failing_on("Compute_Engine");
        let graph = build(TERRAFORM_GRAPH, &config, &loader).unwrap();

        let (_, vm) = node_named(&graph, "google_compute_instance.vm_instance");
        let (_, provider) = node_named(&graph, "provider.google");
        assert!(vm.texture.is_none());
        assert!(vm.icon_path.ends_with("Compute/Compute_Engine.png"));
        assert!(provider.texture.is_some());
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_empty_name_skips_texture_load() {
        let config = SceneConfig::default().with_seed(5);
        let loader = MemoryLoader::new();
        let graph = build(
            r#"{"objects": [{"_gvid": 1, "name": "[root] "}, {"_gvid": 2, "name": "mystery.thing"}]}"#,
            &config,
            &loader,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(loader.requests(), vec!["img/gcp_icons/Extras/Generic_GCP.png".to_string()]);
        let blank = graph.node(graph.find(&ResourceKey::Id(1)).unwrap()).unwrap();
        assert!(blank.icon_path.is_empty() && blank.texture.is_none());
    }
}
