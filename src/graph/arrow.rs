//! Directed edge visuals: a shaft plus a cone pointing at the head node.

use cgmath::{InnerSpace, Vector3};

use super::node::NodeId;

/// Index of an arrow in its owning [`Graph`](super::Graph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrowId(pub usize);

/// Placement and proportions of one arrow, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Where the shaft starts (the tail node's position)
    pub origin: Vector3<f32>,
    /// Unit vector from tail towards head
    pub direction: Vector3<f32>,
    /// Distance between endpoints minus the cone length, never negative
    pub shaft_length: f32,
    pub cone_length: f32,
    /// Cone radius, half the cone length
    pub cone_width: f32,
}

impl ArrowGeometry {
    /// Computes the arrow running from `tail` to `head`.
    ///
    /// Coincident endpoints have no direction; the arrow then points along +Y
    /// with an empty shaft.
    pub fn between(tail: Vector3<f32>, head: Vector3<f32>, cone_length: f32) -> Self {
        let offset = head - tail;
        let distance = offset.magnitude();
        let direction = if distance > f32::EPSILON {
            offset / distance
        } else {
            Vector3::unit_y()
        };

        Self {
            origin: tail,
            direction,
            shaft_length: (distance - cone_length).max(0.0),
            cone_length,
            cone_width: cone_length / 2.0,
        }
    }

    /// Point where the cone tip ends up
    pub fn tip(&self) -> Vector3<f32> {
        self.origin + self.direction * (self.shaft_length + self.cone_length)
    }
}

/// A directed dependency between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub tail: NodeId,
    pub head: NodeId,
    pub color: u32,
    pub geometry: ArrowGeometry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_arrow() {
        let arrow = ArrowGeometry::between(Vector3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 0.0, 0.0), 0.5);

        assert!((arrow.shaft_length - 9.5).abs() < 1e-6);
        assert_eq!(arrow.direction, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(arrow.cone_width, 0.25);
        assert!((arrow.tip() - Vector3::new(10.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_direction_is_normalized() {
        let arrow = ArrowGeometry::between(Vector3::new(1.0, 1.0, 1.0), Vector3::new(4.0, 5.0, 1.0), 0.5);

        assert!((arrow.direction.magnitude() - 1.0).abs() < 1e-6);
        assert!((arrow.direction - Vector3::new(0.6, 0.8, 0.0)).magnitude() < 1e-6);
        assert!((arrow.shaft_length - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_arrows() {
        let same = ArrowGeometry::between(Vector3::new(2.0, 2.0, 2.0), Vector3::new(2.0, 2.0, 2.0), 0.5);
        assert_eq!(same.direction, Vector3::unit_y());
        assert_eq!(same.shaft_length, 0.0);

        let short = ArrowGeometry::between(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.2), 0.5);
        assert_eq!(short.shaft_length, 0.0);
        assert!((short.direction - Vector3::unit_z()).magnitude() < 1e-6);
    }
}
