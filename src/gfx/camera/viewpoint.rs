use cgmath::{Matrix4, One, Quaternion, Rotation, Vector3};

use crate::gfx::{picking::Ray, transform::Transform};
use crate::graph::NodeId;

/// Camera position and orientation, plus the nodes attached to it.
#[derive(Debug, Clone)]
pub struct Viewpoint {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    attached: Vec<NodeId>,
}

impl Viewpoint {
    /// Creates a viewpoint at `position` looking down -Z
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: Quaternion::one(),
            attached: Vec::new(),
        }
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        Transform {
            position: self.position,
            rotation: self.orientation,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
        .to_matrix()
    }

    /// Viewing direction, -Z in camera space
    pub fn forward(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(-Vector3::unit_z())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_x())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_y())
    }

    /// Ray through the center of the view
    pub fn forward_ray(&self) -> Ray {
        Ray::new(self.position, self.forward())
    }

    /// View matrix for rendering (inverse of the world matrix)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let rotation = Matrix4::from(self.orientation.invert());
        rotation * Matrix4::from_translation(-self.position)
    }

    /// Returns false if `node` was already attached
    pub(crate) fn attach(&mut self, node: NodeId) -> bool {
        if self.attached.contains(&node) {
            return false;
        }
        self.attached.push(node);
        true
    }

    /// Returns false if `node` was not attached
    pub(crate) fn detach(&mut self, node: NodeId) -> bool {
        let before = self.attached.len();
        self.attached.retain(|&n| n != node);
        self.attached.len() != before
    }

    pub fn attached(&self) -> &[NodeId] {
        &self.attached
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 5.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Rotation3, SquareMatrix};

    #[test]
    fn test_default_basis() {
        let viewpoint = Viewpoint::default();

        assert_eq!(viewpoint.forward(), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(viewpoint.right(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(viewpoint.forward_ray().origin, Vector3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_turned_basis() {
        let mut viewpoint = Viewpoint::default();
        viewpoint.orientation = Quaternion::from_angle_y(Deg(90.0));

        assert!((viewpoint.forward() - Vector3::new(-1.0, 0.0, 0.0)).magnitude() < 1e-6);
        assert!((viewpoint.right() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_view_matrix_inverts_world() {
        let mut viewpoint = Viewpoint::new(Vector3::new(1.0, 2.0, 3.0));
        viewpoint.orientation = Quaternion::from_angle_y(Deg(40.0)) * Quaternion::from_angle_x(Deg(10.0));

        let product = viewpoint.view_matrix() * viewpoint.world_matrix();
        let identity = Matrix4::<f32>::identity();
        for col in 0..4 {
            assert!((product[col] - identity[col]).magnitude() < 1e-5);
        }
    }

    #[test]
    fn test_attach_is_exclusive_per_node() {
        let mut viewpoint = Viewpoint::default();

        assert!(viewpoint.attach(NodeId(3)));
        assert!(!viewpoint.attach(NodeId(3)));
        assert_eq!(viewpoint.attached(), &[NodeId(3)]);
        assert!(viewpoint.detach(NodeId(3)));
        assert!(!viewpoint.detach(NodeId(3)));
    }
}
