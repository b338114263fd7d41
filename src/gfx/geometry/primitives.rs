//! Primitive shape generation.

use super::GeometryData;

// Outward normal, then the two in-plane axes spanning the face.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

/// Generate a cube of edge length `size` centered at the origin.
///
/// Each face has its own four vertices so the icon texture maps onto every
/// face in full.
pub fn generate_cube(size: f32) -> GeometryData {
    let half = size / 2.0;
    let mut data = GeometryData::default();

    for (normal, u_axis, v_axis) in CUBE_FACES {
        let base = data.vertices.len() as u32;

        for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = [
                (normal[0] + u_axis[0] * u + v_axis[0] * v) * half,
                (normal[1] + u_axis[1] * u + v_axis[1] * v) * half,
                (normal[2] + u_axis[2] * u + v_axis[2] * v) * half,
            ];
            data.vertices.push(position);
            data.normals.push(normal);
            data.tex_coords.push([(u + 1.0) / 2.0, (1.0 - v) / 2.0]);
        }

        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}
