//! # Scene Management
//!
//! The [`Scene`] is the render root: it owns the resource graph, the
//! viewpoint and the theme, and tracks which container each node currently
//! belongs to.
//!
//! ## Containers
//!
//! - the **world root**, whose local space is world space
//! - the **viewpoint**, which nodes join while being dragged
//!
//! A node is in at most one of them at a time. Render traversal
//! ([`Scene::node_instances`], [`Scene::arrow_instances`]) covers both.

pub mod scene;

pub use scene::Scene;
