//! # Node Picking
//!
//! Ray-casting against the node cubes. The pick ray starts at the viewpoint
//! and runs along its forward direction (the reticle in the middle of the
//! view), so no screen-space unprojection is involved.
//!
//! ## How it works
//!
//! 1. **Ray**: viewpoint world position plus forward basis vector
//! 2. **Bounds**: the shared cube mesh's AABB, tested against the ray moved
//!    into each node's local space
//! 3. **Selection**: the closest hit wins
//!
//! The [`drag`] submodule builds the pick-and-drag gesture on top of this.

pub mod drag;

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::gfx::{geometry::generate_cube, transform::transform_point};
use crate::graph::NodeId;

pub use drag::{DragController, DragState, Selection};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// The same ray expressed in another space. The direction is left
    /// unnormalized so distances along it still match the original ray.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            origin: transform_point(matrix, self.origin),
            direction: (matrix * self.direction.extend(0.0)).truncate(),
        }
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            let zero = Vector3::new(0.0, 0.0, 0.0);
            return Self::new(zero, zero);
        };

        let mut min = Vector3::from(*first);
        let mut max = min;
        for vertex in vertices.iter().skip(1) {
            for axis in 0..3 {
                min[axis] = min[axis].min(vertex[axis]);
                max[axis] = max[axis].max(vertex[axis]);
            }
        }

        Self::new(min, max)
    }

    /// Slab test. Returns the distance to the entry point, or to the exit
    /// point when the ray starts inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() < f32::EPSILON {
                // Parallel to this slab: either always inside it or never
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let t1 = (self.min[axis] - origin) / direction;
            let t2 = (self.max[axis] - origin) / direction;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

/// Result of a pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    pub node: NodeId,
    /// Distance from the ray origin to the hit
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Picks nodes by casting rays against their cube bounds.
#[derive(Debug, Clone)]
pub struct NodePicker {
    local_bounds: AABB,
}

impl NodePicker {
    /// Creates a picker for cubes with edge length `node_size`
    pub fn new(node_size: f32) -> Self {
        Self {
            local_bounds: AABB::from_vertices(&generate_cube(node_size).vertices),
        }
    }

    pub fn local_bounds(&self) -> AABB {
        self.local_bounds
    }

    /// Nearest node hit by `ray` among `candidates` (id, world matrix).
    pub fn pick<I>(&self, ray: &Ray, candidates: I) -> Option<PickResult>
    where
        I: IntoIterator<Item = (NodeId, Matrix4<f32>)>,
    {
        let mut closest_result: Option<PickResult> = None;

        for (node, world) in candidates {
            // Test in the node's own space so rotated cubes keep tight bounds
            let Some(inverse) = world.invert() else {
                continue;
            };
            let local_ray = ray.transform(&inverse);

            if let Some(distance) = self.local_bounds.intersect_ray(&local_ray) {
                if closest_result
                    .as_ref()
                    .map_or(true, |result| distance < result.distance)
                {
                    closest_result = Some(PickResult {
                        node,
                        distance,
                        intersection_point: ray.point_at(distance),
                    });
                }
            }
        }

        closest_result
    }
}

impl Default for NodePicker {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());

        let behind = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(behind.direction.z > 0.0 && aabb.intersect_ray(&behind).is_none());
    }

    #[test]
    fn test_picker_prefers_nearest() {
        let picker = NodePicker::new(1.0);
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let far = Matrix4::from_translation(Vector3::new(0.0, 0.0, -10.0));
        let near = Matrix4::from_translation(Vector3::new(0.2, 0.0, 0.0));
        let off_axis = Matrix4::from_translation(Vector3::new(3.0, 0.0, 2.0));

        let hit = picker
            .pick(&ray, [(NodeId(0), far), (NodeId(1), near), (NodeId(2), off_axis)])
            .unwrap();

        assert_eq!(hit.node, NodeId(1));
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert!((hit.intersection_point - Vector3::new(0.0, 0.0, 0.5)).magnitude() < 1e-5);
    }

    #[test]
    fn test_rotated_node_uses_its_own_bounds() {
        let picker = NodePicker::new(1.0);
        let rotated = Matrix4::from_angle_z(cgmath::Deg(45.0));

        // Inside the rotated cube's world AABB, but past the cube's corner
        let corner = Ray::new(Vector3::new(0.5, 0.5, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(picker.pick(&corner, [(NodeId(0), rotated)]).is_none());

        let inside = Ray::new(Vector3::new(0.0, 0.6, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = picker.pick(&inside, [(NodeId(0), rotated)]).unwrap();
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert!((hit.intersection_point - Vector3::new(0.0, 0.6, 0.5)).magnitude() < 1e-5);
    }

    #[test]
    fn test_scaled_node_reports_world_distance() {
        let picker = NodePicker::new(1.0);
        let big = Matrix4::from_translation(Vector3::new(0.0, 0.0, -2.0)) * Matrix4::from_scale(4.0);
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));

        let hit = picker.pick(&ray, [(NodeId(3), big)]).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_picker_miss() {
        let picker = NodePicker::default();
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 1.0, 0.0));

        assert!(picker
            .pick(&ray, [(NodeId(0), Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)))])
            .is_none());
    }
}
