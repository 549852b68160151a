//! The window renderer.

use std::collections::HashMap;

use cgmath::{Matrix4, Point3, SquareMatrix};
use log::{debug, error, warn};
use wgpu::{util::DeviceExt, Device, Queue, Surface, SurfaceConfiguration};

use super::{
    backend::{DrawPass, GraphicsBackend, MeshHandle},
    bind_group_state::CameraUniform,
    material::TextureAtlas,
    meshing::Mesh,
    pipeline_manager::{FrameDraw, PipelineManager},
    texture::build_atlas_image,
};
use crate::error::BackendError;

/// GPU buffers of one uploaded mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Draws queued meshes to a window surface with WebGPU.
///
/// Draw calls are collected during the frame and submitted together by
/// [`present`](Self::present).
pub struct WgpuBackend {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    pipeline_manager: PipelineManager,
    meshes: HashMap<MeshHandle, GpuMesh>,
    next_handle: u64,
    queued: Vec<(MeshHandle, Matrix4<f32>, DrawPass)>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    seconds: f32,
}

impl WgpuBackend {
    /// Builds the pipelines for a configured surface.
    ///
    /// # Arguments
    /// * `surface` - The window surface, already configured with `surface_config`
    /// * `surface_config` - Size and format of the surface
    /// * `device` - The WebGPU device
    /// * `queue` - The device's queue
    /// * `atlas` - Layout of the material atlas to paint and upload
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        atlas: &TextureAtlas,
    ) -> Self {
        let atlas_image = build_atlas_image(atlas);
        let pipeline_manager = PipelineManager::new(&device, &queue, &surface_config, &atlas_image);

        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            meshes: HashMap::new(),
            next_handle: 0,
            queued: Vec::new(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            seconds: 0.0,
        }
    }

    /// Handles window resize events.
    ///
    /// Zero-sized windows (minimized) keep the previous configuration.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager.resize(&self.device, &self.surface_config);
    }

    /// Submits the queued draws and shows the frame.
    ///
    /// Lost or outdated surfaces are reconfigured and the frame is skipped.
    ///
    /// # Errors
    /// [`BackendError::OutOfMemory`] when the surface cannot allocate a frame.
    pub fn present(&mut self) -> Result<(), BackendError> {
        let queued = std::mem::take(&mut self.queued);
        let mut draws = Vec::with_capacity(queued.len());
        let mut models = Vec::with_capacity(queued.len());
        for (handle, transform, pass) in &queued {
            let Some(mesh) = self.meshes.get(handle) else {
                warn!("Skipping draw of released mesh {handle:?}");
                continue;
            };
            draws.push(FrameDraw {
                vertex_buffer: &mesh.vertex_buffer,
                index_buffer: &mesh.index_buffer,
                index_count: mesh.index_count,
                pass: *pass,
            });
            models.push(*transform);
        }

        let eye = self
            .view
            .invert()
            .map(|inverse| Point3::new(inverse.w.x, inverse.w.y, inverse.w.z))
            .unwrap_or(Point3::new(0.0, 0.0, 0.0));
        let camera = CameraUniform::new(self.view, self.projection, eye, self.seconds);

        let result = self.pipeline_manager.render(
            &self.surface,
            &self.device,
            &self.queue,
            &camera,
            &draws,
            &models,
        );

        match result {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Surface out of memory");
                Err(BackendError::OutOfMemory)
            }
            Err(err) => {
                warn!("Skipping frame: {err:?}");
                Ok(())
            }
        }
    }
}

impl GraphicsBackend for WgpuBackend {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        debug!(
            "Uploaded mesh {handle:?}: {} vertices, {} indices",
            mesh.vertices.len(),
            mesh.indices.len()
        );
        self.meshes.insert(
            handle,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
            },
        );
        handle
    }

    fn release_mesh(&mut self, handle: MeshHandle) {
        if let Some(mesh) = self.meshes.remove(&handle) {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
    }

    fn draw(&mut self, handle: MeshHandle, transform: Matrix4<f32>, pass: DrawPass) {
        self.queued.push((handle, transform, pass));
    }

    fn set_camera(&mut self, view: Matrix4<f32>, projection: Matrix4<f32>) {
        self.view = view;
        self.projection = projection;
    }

    fn set_time(&mut self, seconds: f32) {
        self.seconds = seconds;
    }
}
