//! Per-instance GPU records for the node cubes and edge arrows.
//!
//! The renderer draws one cube mesh and one arrow mesh, instanced. These
//! structs are what goes in the instance buffers.

use cgmath::Matrix4;

use crate::graph::ArrowGeometry;

/// One node cube
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeInstance {
    /// World matrix, column-major
    pub model: [[f32; 4]; 4],
    /// 1.0 while the node is being dragged
    pub selected: f32,
    pub _padding: [f32; 3],
}

impl NodeInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32,
    ];

    pub fn new(model: Matrix4<f32>, selected: bool) -> Self {
        Self {
            model: model.into(),
            selected: if selected { 1.0 } else { 0.0 },
            _padding: [0.0; 3],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<NodeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One arrow: shaft from `origin` along `direction`, then the cone
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ArrowInstance {
    pub origin: [f32; 3],
    pub shaft_length: f32,
    pub direction: [f32; 3],
    pub cone_length: f32,
    pub color: [f32; 3],
    pub cone_width: f32,
}

impl ArrowInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn new(geometry: &ArrowGeometry, color: [f32; 3]) -> Self {
        Self {
            origin: geometry.origin.into(),
            shaft_length: geometry.shaft_length,
            direction: geometry.direction.into(),
            cone_length: geometry.cone_length,
            color,
            cone_width: geometry.cone_width,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ArrowInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
