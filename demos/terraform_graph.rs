//! # Terraform Graph Example
//!
//! Loads a `terraform graph` export converted to JSON and opens it in the
//! viewer. Resources are drawn as flat-shaded cubes, dependencies as red
//! arrows. Pass a descriptor path to view your own graph.
//!
//! Controls:
//! - Click: lock the pointer, then pick up the node under the reticle
//! - Hold click + move: carry the node, release to drop it
//! - W/A/S/D or arrow keys: walk
//! - Escape: quit

use terragraph::{GraphApp, SceneConfig};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/data/graph.json".to_string());

    // Same layout on every run
    let config = SceneConfig::default().with_seed(7);
    let mut app = GraphApp::from_descriptor_path(&path, &config)?;

    // Runs after each drawn frame
    let mut frames = 0u64;
    app.set_render(move |scene| {
        frames += 1;
        if frames % 600 == 0 {
            let arrows = scene.arrow_instances();
            log::debug!(
                "frame {}: {} nodes, {} arrows, camera at {:?}",
                frames,
                scene.node_instances(None).len(),
                arrows.len(),
                scene.viewpoint.position
            );
        }
    });

    app.run()
}
