//! WGPU-based rendering engine for the graph viewer.

use std::sync::Arc;

use anyhow::Context;
use cgmath::{perspective, Deg, Matrix4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::gfx::{
    camera::Viewpoint,
    geometry::GeometryData,
    instances::{ArrowInstance, NodeInstance},
    scene::Scene,
};
use crate::graph::NodeId;
use crate::theme::{rgb_f32, SceneTheme};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHAFT_RADIUS: f32 = 0.02;
const FOVY_DEGREES: f32 = 75.0;
const ZNEAR: f32 = 0.1;
const ZFAR: f32 = 1000.0;

/// Cube mesh vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn from_geometry(geometry: &GeometryData) -> Vec<Self> {
        geometry
            .vertices
            .iter()
            .zip(&geometry.normals)
            .map(|(&position, &normal)| Self { position, normal })
            .collect()
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Arrow mesh vertex in arrow space: `y` runs along the arrow, `cone`
/// marks the head so the shader can place it after the shaft.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ArrowVertex {
    pub position: [f32; 3],
    pub cone: f32,
}

impl ArrowVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ArrowVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Square shaft of unit length plus a square-based cone of unit height
    pub fn mesh() -> (Vec<ArrowVertex>, Vec<u32>) {
        let mut vertices = Vec::with_capacity(13);
        let r = SHAFT_RADIUS;
        for y in [0.0, 1.0] {
            for (x, z) in [(-r, -r), (r, -r), (r, r), (-r, r)] {
                vertices.push(ArrowVertex { position: [x, y, z], cone: 0.0 });
            }
        }
        for (x, z) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            vertices.push(ArrowVertex { position: [x, 0.0, z], cone: 1.0 });
        }
        vertices.push(ArrowVertex { position: [0.0, 1.0, 0.0], cone: 1.0 });

        let mut indices = Vec::with_capacity(42);
        for side in 0..4u32 {
            let next = (side + 1) % 4;
            indices.extend_from_slice(&[side, next, next + 4, side, next + 4, side + 4]);
        }
        for side in 0..4u32 {
            let next = (side + 1) % 4;
            indices.extend_from_slice(&[8 + side, 8 + next, 12]);
        }
        indices.extend_from_slice(&[8, 10, 9, 8, 11, 10]);

        (vertices, indices)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Reticle color in rgb, viewport aspect in w
    pub reticle: [f32; 4],
}

impl CameraUniform {
    pub fn new(viewpoint: &Viewpoint, theme: &SceneTheme, aspect: f32) -> Self {
        let proj = OPENGL_TO_WGPU_MATRIX * perspective(Deg(FOVY_DEGREES), aspect, ZNEAR, ZFAR);
        let [r, g, b] = rgb_f32(theme.reticle);
        Self {
            view_proj: (proj * viewpoint.view_matrix()).into(),
            reticle: [r, g, b, aspect],
        }
    }
}

/// Instance buffer that grows to the largest frame seen so far
struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
}

impl InstanceBuffer {
    fn new<T: bytemuck::Pod>(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            label,
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (capacity * std::mem::size_of::<T>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            capacity,
            len: 0,
        }
    }

    fn upload<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.len() > self.capacity {
            *self = Self::new::<T>(device, self.label, data.len().next_power_of_two());
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.len = data.len() as u32;
    }
}

/// Owns the surface, device and pipelines, and draws a [`Scene`] each frame.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    node_pipeline: wgpu::RenderPipeline,
    arrow_pipeline: wgpu::RenderPipeline,
    reticle_pipeline: wgpu::RenderPipeline,
    cube_vertices: wgpu::Buffer,
    cube_indices: wgpu::Buffer,
    cube_index_count: u32,
    arrow_vertices: wgpu::Buffer,
    arrow_indices: wgpu::Buffer,
    arrow_index_count: u32,
    node_instances: InstanceBuffer,
    arrow_instances: InstanceBuffer,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`, with the node mesh
    /// taken from `scene`.
    pub async fn new(window: Arc<Window>, width: u32, height: u32, scene: &Scene) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let camera_uniform = CameraUniform::new(&scene.viewpoint, &scene.theme, aspect(&config));
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Graph Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("graph.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Graph Pipeline Layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        let node_pipeline = create_pipeline(
            &device,
            &layout,
            &shader,
            format,
            "Node Pipeline",
            "vs_node",
            &[MeshVertex::desc(), NodeInstance::desc()],
            true,
        );
        let arrow_pipeline = create_pipeline(
            &device,
            &layout,
            &shader,
            format,
            "Arrow Pipeline",
            "vs_arrow",
            &[ArrowVertex::desc(), ArrowInstance::desc()],
            true,
        );
        let reticle_pipeline = create_pipeline(
            &device,
            &layout,
            &shader,
            format,
            "Reticle Pipeline",
            "vs_reticle",
            &[],
            false,
        );

        let mesh = scene.node_mesh();
        let cube_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&MeshVertex::from_geometry(mesh)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (arrow_mesh, arrow_index_data) = ArrowVertex::mesh();
        let arrow_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Arrow Vertex Buffer"),
            contents: bytemuck::cast_slice(&arrow_mesh),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let arrow_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Arrow Index Buffer"),
            contents: bytemuck::cast_slice(&arrow_index_data),
            usage: wgpu::BufferUsages::INDEX,
        });

        let node_instances =
            InstanceBuffer::new::<NodeInstance>(&device, "Node Instances", scene.graph.node_count());
        let arrow_instances =
            InstanceBuffer::new::<ArrowInstance>(&device, "Arrow Instances", scene.graph.arrow_count());

        log::info!("Renderer ready ({:?}, {}x{})", format, config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            camera_buffer,
            camera_bind_group,
            node_pipeline,
            arrow_pipeline,
            reticle_pipeline,
            cube_vertices,
            cube_indices,
            cube_index_count: mesh.indices.len() as u32,
            arrow_vertices,
            arrow_indices,
            arrow_index_count: arrow_index_data.len() as u32,
            node_instances,
            arrow_instances,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    /// Draws one frame. A lost or outdated surface is reconfigured and the
    /// frame skipped.
    pub fn render_frame(&mut self, scene: &Scene, selected: Option<NodeId>) -> Result<(), wgpu::SurfaceError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let camera_uniform = CameraUniform::new(&scene.viewpoint, &scene.theme, aspect(&self.config));
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));
        self.node_instances
            .upload(&self.device, &self.queue, &scene.node_instances(selected));
        self.arrow_instances
            .upload(&self.device, &self.queue, &scene.arrow_instances());

        let [r, g, b] = rgb_f32(scene.theme.sky);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Graph Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            if self.node_instances.len > 0 {
                pass.set_pipeline(&self.node_pipeline);
                pass.set_vertex_buffer(0, self.cube_vertices.slice(..));
                pass.set_vertex_buffer(1, self.node_instances.buffer.slice(..));
                pass.set_index_buffer(self.cube_indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..self.node_instances.len);
            }

            if self.arrow_instances.len > 0 {
                pass.set_pipeline(&self.arrow_pipeline);
                pass.set_vertex_buffer(0, self.arrow_vertices.slice(..));
                pass.set_vertex_buffer(1, self.arrow_instances.buffer.slice(..));
                pass.set_index_buffer(self.arrow_indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.arrow_index_count, 0, 0..self.arrow_instances.len);
            }

            if scene.viewpoint_anchored() {
                pass.set_pipeline(&self.reticle_pipeline);
                pass.draw(0..6, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn aspect(config: &wgpu::SurfaceConfiguration) -> f32 {
    config.width.max(1) as f32 / config.height.max(1) as f32
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    vertex_entry: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    depth_test: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vertex_entry),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_test,
            depth_compare: if depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
