//! # Scene Session
//!
//! Wires a built graph, the controls adapter and the drag controller to one
//! scene, and routes [`InputEvent`]s between them. The windowed shell in
//! [`crate::app`] is a thin layer over this; headless callers and tests drive
//! it directly.

use crate::{
    config::SceneConfig,
    error::GraphError,
    gfx::{
        camera::{Controls, HeadsetProbe},
        instances::NodeInstance,
        picking::DragController,
        resources::TextureLoader,
        scene::Scene,
    },
    graph::{Graph, GraphBuilder, NodeId, ResourceDescriptor},
    input::InputEvent,
};

pub struct SceneSession {
    pub scene: Scene,
    pub controls: Controls,
    pub drag: DragController,
}

impl SceneSession {
    /// Builds the graph, puts it under the render root and picks controls.
    ///
    /// Fails if the graph cannot be built; nothing is added to any scene then.
    pub async fn start<L, P>(
        config: &SceneConfig,
        descriptor: &ResourceDescriptor,
        loader: &L,
        probe: &P,
    ) -> Result<Self, GraphError>
    where
        L: TextureLoader + ?Sized,
        P: HeadsetProbe + ?Sized,
    {
        let graph = GraphBuilder::new(config, loader).build(descriptor).await?;

        let mut scene = Scene::new(config);
        scene.insert_graph(graph);
        let controls = Controls::initialize(probe, &mut scene, config).await;

        Ok(Self {
            scene,
            controls,
            drag: DragController::new(config.node_size),
        })
    }

    /// Swaps in a new graph. Any drag in progress is abandoned first, since
    /// its node ids belong to the old graph.
    pub fn replace_graph(&mut self, graph: Graph) {
        if let Some(id) = self.drag.selected() {
            log::debug!("Abandoning drag of {:?} for graph reload", id);
        }
        self.drag.reset();
        self.scene.insert_graph(graph);
    }

    /// Builds `descriptor` and swaps it in. On error the current graph stays.
    pub async fn reload<L>(
        &mut self,
        config: &SceneConfig,
        descriptor: &ResourceDescriptor,
        loader: &L,
    ) -> Result<(), GraphError>
    where
        L: TextureLoader + ?Sized,
    {
        let graph = GraphBuilder::new(config, loader).build(descriptor).await?;
        self.replace_graph(graph);
        Ok(())
    }

    /// Routes one input event. Returns true if anything reacted to it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PrimaryPress => self.drag.press(&mut self.scene).is_some(),
            InputEvent::PrimaryRelease => self.drag.release(&mut self.scene).is_some(),
            InputEvent::KeyDown(code) => self.controls.key_event(code, true),
            InputEvent::KeyUp(code) => self.controls.key_event(code, false),
            InputEvent::PointerMotion { dx, dy } => {
                if self.controls.is_headset() {
                    return false;
                }
                self.controls.look(&mut self.scene.viewpoint, dx, dy);
                true
            }
        }
    }

    /// Per-frame hook: move the viewpoint, then drag the selection's arrows along.
    pub fn update_frame(&mut self) {
        self.controls.update(&mut self.scene.viewpoint);
        self.drag.update_selected_arrows(&mut self.scene);
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.drag.selected()
    }

    pub fn node_instances(&self) -> Vec<NodeInstance> {
        self.scene.node_instances(self.selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetLoadError;
    use crate::gfx::{camera::NoHeadset, resources::IconTexture};
    use cgmath::{InnerSpace, Vector3};
    use futures::executor::block_on;
    use futures::future::{BoxFuture, FutureExt};
    use winit::keyboard::KeyCode;

    struct BlankLoader;

    impl TextureLoader for BlankLoader {
        fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<IconTexture, AssetLoadError>> {
            async move { Ok(IconTexture::solid(path, [0, 0, 0, 255])) }.boxed()
        }
    }

    // vm lands at the origin, straight ahead of the default camera
    const LAYOUT: &str = r#"{
        "google_compute_instance.vm_instance": {"x": 0, "y": -20, "next": ["google_compute_network.vpc_network"]},
        "google_compute_network.vpc_network": {"x": 100, "y": -20}
    }"#;

    fn session() -> SceneSession {
        let descriptor = ResourceDescriptor::from_json(LAYOUT).unwrap();
        block_on(SceneSession::start(
            &SceneConfig::default(),
            &descriptor,
            &BlankLoader,
            &NoHeadset,
        ))
        .unwrap()
    }

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_start_populates_scene() {
        let session = session();

        assert_eq!(session.scene.get_object_count(), 2);
        assert_eq!(session.scene.graph.arrow_count(), 1);
        assert!(!session.controls.is_headset());
        assert!(session.scene.viewpoint_anchored());
        assert_eq!(session.node_instances().len(), 2);
    }

    #[test]
    fn test_start_fails_on_unknown_edge_endpoint() {
        let descriptor = ResourceDescriptor::from_json(
            r#"{"objects": [{"_gvid": 0, "name": "a"}], "edges": [{"tail": 0, "head": 7}]}"#,
        )
        .unwrap();
        let result = block_on(SceneSession::start(
            &SceneConfig::default().with_seed(1),
            &descriptor,
            &BlankLoader,
            &NoHeadset,
        ));

        assert!(matches!(result, Err(GraphError::UnresolvedEndpoint { .. })));
    }

    #[test]
    fn test_drag_while_walking() {
        let mut session = session();
        let vm = session
            .scene
            .graph
            .find_by_name("google_compute_instance.vm_instance")
            .unwrap();

        assert!(session.handle_input(InputEvent::PrimaryPress));
        assert_eq!(session.selected(), Some(vm));

        assert!(session.handle_input(InputEvent::KeyDown(KeyCode::KeyW)));
        for _ in 0..10 {
            session.update_frame();
        }
        assert!(session.handle_input(InputEvent::KeyUp(KeyCode::KeyW)));

        // Ten steps of 0.1 towards -Z, carrying the node along
        let position = session.scene.node_world_position(vm).unwrap();
        assert!(close(position, Vector3::new(0.0, 0.0, -1.0)), "{:?}", position);

        let (_, arrow) = session.scene.graph.arrows().next().unwrap();
        assert!(close(arrow.geometry.origin, position));

        assert!(session.handle_input(InputEvent::PrimaryRelease));
        assert_eq!(session.selected(), None);
        let position = session.scene.graph.node(vm).unwrap().transform.position;
        assert!(close(position, Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_reload_during_drag() {
        let mut session = session();
        assert!(session.handle_input(InputEvent::PrimaryPress));

        let descriptor = ResourceDescriptor::from_json(r#"{"lone": {"x": 0, "y": -20}}"#).unwrap();
        block_on(session.reload(&SceneConfig::default(), &descriptor, &BlankLoader)).unwrap();

        assert_eq!(session.selected(), None);
        assert!(!session.handle_input(InputEvent::PrimaryRelease));
        assert!(session.scene.viewpoint.attached().is_empty());
        let lone = session.scene.graph.find_by_name("lone").unwrap();
        let position = session.scene.node_world_position(lone).unwrap();
        assert!(close(position, Vector3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_failed_reload_keeps_current_graph() {
        let mut session = session();
        let descriptor = ResourceDescriptor::from_json(
            r#"{"a": {"x": 0, "y": 0, "next": ["missing"]}}"#,
        )
        .unwrap();

        let result = block_on(session.reload(&SceneConfig::default(), &descriptor, &BlankLoader));
        assert!(matches!(result, Err(GraphError::UnresolvedEndpoint { .. })));
        assert_eq!(session.scene.get_object_count(), 2);
    }

    #[test]
    fn test_unhandled_input() {
        let mut session = session();

        assert!(!session.handle_input(InputEvent::PrimaryRelease));
        assert!(!session.handle_input(InputEvent::KeyDown(KeyCode::KeyQ)));
        assert!(session.handle_input(InputEvent::PointerMotion { dx: 4.0, dy: 0.0 }));
    }
}
