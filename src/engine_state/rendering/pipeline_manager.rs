//! Manages the WebGPU render pipelines and the frame's render pass.
//!
//! # Architecture
//!
//! One shader module provides three fragment entry points, each with its own
//! pipeline sharing a single layout:
//!
//! - terrain: opaque, back faces culled, depth tested and written
//! - water: alpha blended, both faces, depth tested but not written
//! - marker: line list, depth tested
//!
//! Draws are recorded in that pass order so transparent water blends over
//! the finished terrain.

use image::RgbaImage;
use log::trace;
use wgpu::{Device, Queue, RenderPipeline, Surface, SurfaceConfiguration, TextureFormat};

use super::{
    backend::DrawPass,
    bind_group_state::{BindGroupState, CameraUniform, MODEL_UNIFORM_STRIDE},
    texture,
    vertex::Vertex,
};

/// WGSL source of every pipeline.
const SHADER_SOURCE: &str = include_str!("shaders/voxel.wgsl");

/// Colour the frame is cleared to; the fog blends toward it.
pub const SKY_COLOR: wgpu::Color = wgpu::Color {
    r: 0.58,
    g: 0.83,
    b: 0.99,
    a: 1.0,
};

/// Everything needed to draw one queued mesh.
pub struct FrameDraw<'a> {
    /// Vertex buffer of the mesh
    pub vertex_buffer: &'a wgpu::Buffer,
    /// Index buffer of the mesh
    pub index_buffer: &'a wgpu::Buffer,
    /// Number of indices to draw
    pub index_count: u32,
    /// Pipeline to draw with
    pub pass: DrawPass,
}

/// Owns the pipelines, the depth buffer and the bind groups.
pub struct PipelineManager {
    /// Manages all bind groups used in the pipeline
    pub bind_group_state: BindGroupState,
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
    terrain_pipeline: RenderPipeline,
    water_pipeline: RenderPipeline,
    marker_pipeline: RenderPipeline,
}

impl PipelineManager {
    /// Creates the pipelines and their shared resources.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for the atlas upload
    /// * `config` - Surface configuration containing size and format
    /// * `atlas_image` - The painted material atlas
    pub fn new(device: &Device, queue: &Queue, config: &SurfaceConfiguration, atlas_image: &RgbaImage) -> Self {
        let bind_group_state = BindGroupState::new(device, queue, atlas_image);
        let depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Voxel Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Voxel Pipeline Layout"),
            bind_group_layouts: &bind_group_state.layouts(),
            push_constant_ranges: &[],
        });

        let builder = PipelineBuilder {
            device,
            layout: &pipeline_layout,
            shader: &shader,
            format: config.format,
        };

        let terrain_pipeline = builder.build(
            "Terrain Pipeline",
            "fs_terrain",
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
            Some(wgpu::BlendState::REPLACE),
            true,
        );
        let water_pipeline = builder.build(
            "Water Pipeline",
            "fs_water",
            wgpu::PrimitiveTopology::TriangleList,
            None,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );
        let marker_pipeline = builder.build(
            "Marker Pipeline",
            "fs_marker",
            wgpu::PrimitiveTopology::LineList,
            None,
            Some(wgpu::BlendState::REPLACE),
            true,
        );

        Self {
            bind_group_state,
            depth_texture,
            terrain_pipeline,
            water_pipeline,
            marker_pipeline,
        }
    }

    fn pipeline(&self, pass: DrawPass) -> &RenderPipeline {
        match pass {
            DrawPass::Terrain => &self.terrain_pipeline,
            DrawPass::Water => &self.water_pipeline,
            DrawPass::Marker => &self.marker_pipeline,
        }
    }

    /// Renders a frame to the given surface.
    ///
    /// `models[i]` is the model matrix of `draws[i]`.
    ///
    /// # Errors
    /// Returns the surface error when no frame could be acquired; nothing is drawn then.
    pub fn render(
        &mut self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        camera: &CameraUniform,
        draws: &[FrameDraw<'_>],
        models: &[cgmath::Matrix4<f32>],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;

        self.bind_group_state.write_camera(queue, camera);
        self.bind_group_state.write_models(device, queue, models);

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            rpass.set_bind_group(0, self.bind_group_state.camera_bind_group(), &[]);
            rpass.set_bind_group(2, self.bind_group_state.texture_bind_group(), &[]);

            for pass in [DrawPass::Terrain, DrawPass::Water, DrawPass::Marker] {
                rpass.set_pipeline(self.pipeline(pass));
                for (slot, draw) in draws.iter().enumerate().filter(|(_, draw)| draw.pass == pass) {
                    let offset = (slot as u64 * MODEL_UNIFORM_STRIDE) as u32;
                    rpass.set_bind_group(1, self.bind_group_state.model_bind_group(), &[offset]);
                    rpass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                    rpass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..draw.index_count, 0, 0..1);
                }
            }
        }

        queue.submit([encoder.finish()]);
        frame.present();
        trace!("Presented frame with {} draws", draws.len());
        Ok(())
    }

    /// Handles window resize events by recreating the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The new surface configuration containing the updated size
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}

/// Shared settings of the three pipelines.
struct PipelineBuilder<'a> {
    device: &'a Device,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    format: TextureFormat,
}

impl PipelineBuilder<'_> {
    fn build(
        &self,
        label: &str,
        fragment_entry: &str,
        topology: wgpu::PrimitiveTopology,
        cull_mode: Option<wgpu::Face>,
        blend: Option<wgpu::BlendState>,
        depth_write_enabled: bool,
    ) -> RenderPipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some(fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }
}
