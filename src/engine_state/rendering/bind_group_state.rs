//! Manages WebGPU bind groups and their layouts.
//!
//! Three groups are bound for every draw:
//!
//! * group 0: the camera uniform, written once per frame
//! * group 1: the model matrix, one 256-byte slot per draw selected by dynamic offset
//! * group 2: the material atlas texture and its sampler

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, Point3};
use image::RgbaImage;
use log::debug;
use wgpu::{util::DeviceExt, BindGroup, BindGroupLayout, Buffer, Device, Queue};

use super::texture::Texture;

/// Distance between consecutive model slots; the minimum uniform offset alignment WebGPU guarantees.
pub const MODEL_UNIFORM_STRIDE: u64 = 256;
/// Model slots allocated up front.
const INITIAL_MODEL_CAPACITY: u64 = 256;

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the model bind group
pub const MODEL_BIND_GROUP: &str = "model_bind_group";
/// Name of the model bind group layout
pub const MODEL_BIND_GROUP_LAYOUT: &str = "model_bind_group_layout";
/// Name of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";

/// Per-frame camera data as laid out in the shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    /// Projection times view
    pub view_proj: [[f32; 4]; 4],
    /// Eye position in xyz, animation time in seconds in w
    pub position: [f32; 4],
}

impl CameraUniform {
    /// Packs the camera matrices, eye position and clock.
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>, eye: Point3<f32>, seconds: f32) -> Self {
        Self {
            view_proj: (projection * view).into(),
            position: [eye.x, eye.y, eye.z, seconds],
        }
    }
}

/// Lays out model matrices at [`MODEL_UNIFORM_STRIDE`] intervals.
pub fn pack_model_matrices(models: &[Matrix4<f32>]) -> Vec<u8> {
    let stride = MODEL_UNIFORM_STRIDE as usize;
    let mut bytes = vec![0u8; models.len() * stride];
    for (slot, model) in bytes.chunks_exact_mut(stride).zip(models) {
        let columns: [[f32; 4]; 4] = (*model).into();
        let matrix_bytes: &[u8] = bytemuck::cast_slice(&columns);
        slot[..matrix_bytes.len()].copy_from_slice(matrix_bytes);
    }
    bytes
}

/// Owns the uniform buffers, the atlas texture and the bind groups that expose them.
pub struct BindGroupState {
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    camera_bind_group_layout: BindGroupLayout,
    model_buffer: Buffer,
    model_capacity: u64,
    model_bind_group: BindGroup,
    model_bind_group_layout: BindGroupLayout,
    #[allow(dead_code)]
    atlas: Texture,
    texture_bind_group: BindGroup,
    texture_bind_group_layout: BindGroupLayout,
}

impl BindGroupState {
    /// Creates the camera, model and texture bind groups.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue used to upload the atlas
    /// * `atlas_image` - The painted material atlas
    pub fn new(device: &Device, queue: &Queue, atlas_image: &RgbaImage) -> Self {
        let (camera_buffer, camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device);

        let model_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<[[f32; 4]; 4]>() as u64),
                },
                count: None,
            }],
            label: Some(MODEL_BIND_GROUP_LAYOUT),
        });
        let (model_buffer, model_bind_group) =
            Self::generate_model_bindgroup(device, &model_bind_group_layout, INITIAL_MODEL_CAPACITY);

        let atlas = Texture::from_image(device, queue, atlas_image, "Material Atlas");
        let (texture_bind_group, texture_bind_group_layout) = Self::generate_texture_bindgroups(device, &atlas);

        Self {
            camera_buffer,
            camera_bind_group,
            camera_bind_group_layout,
            model_buffer,
            model_capacity: INITIAL_MODEL_CAPACITY,
            model_bind_group,
            model_bind_group_layout,
            atlas,
            texture_bind_group,
            texture_bind_group_layout,
        }
    }

    /// The layouts of groups 0, 1 and 2, in binding order.
    pub fn layouts(&self) -> [&BindGroupLayout; 3] {
        [
            &self.camera_bind_group_layout,
            &self.model_bind_group_layout,
            &self.texture_bind_group_layout,
        ]
    }

    /// The camera bind group (group 0).
    pub fn camera_bind_group(&self) -> &BindGroup {
        &self.camera_bind_group
    }

    /// The model bind group (group 1); bind it with a dynamic offset.
    pub fn model_bind_group(&self) -> &BindGroup {
        &self.model_bind_group
    }

    /// The atlas bind group (group 2).
    pub fn texture_bind_group(&self) -> &BindGroup {
        &self.texture_bind_group
    }

    /// Uploads this frame's camera uniform.
    pub fn write_camera(&self, queue: &Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Uploads this frame's model matrices, growing the buffer if needed.
    ///
    /// Draw `i` then binds group 1 at offset `i * MODEL_UNIFORM_STRIDE`.
    pub fn write_models(&mut self, device: &Device, queue: &Queue, models: &[Matrix4<f32>]) {
        let needed = models.len() as u64;
        if needed > self.model_capacity {
            let capacity = needed.next_power_of_two();
            debug!("Growing model uniform buffer to {capacity} slots");
            let (buffer, bind_group) =
                Self::generate_model_bindgroup(device, &self.model_bind_group_layout, capacity);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = capacity;
        }
        if !models.is_empty() {
            queue.write_buffer(&self.model_buffer, 0, &pack_model_matrices(models));
        }
    }

    fn generate_camera_bindgroups(device: &Device) -> (Buffer, BindGroup, BindGroupLayout) {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some(CAMERA_BIND_GROUP_LAYOUT),
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        (camera_buffer, camera_bind_group, camera_bind_group_layout)
    }

    fn generate_model_bindgroup(device: &Device, layout: &BindGroupLayout, capacity: u64) -> (Buffer, BindGroup) {
        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Buffer"),
            size: capacity * MODEL_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<[[f32; 4]; 4]>() as u64),
                }),
            }],
            label: Some(MODEL_BIND_GROUP),
        });

        (model_buffer, model_bind_group)
    }

    fn generate_texture_bindgroups(device: &Device, atlas: &Texture) -> (BindGroup, BindGroupLayout) {
        let texture_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    // This should match the filterable field of the texture entry above.
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some(TEXTURE_BIND_GROUP_LAYOUT),
        });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_bind_group, texture_bind_group_layout)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{SquareMatrix, Vector3};

    use super::*;

    #[test]
    fn test_camera_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        let uniform = CameraUniform::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Point3::new(1.0, 2.0, 3.0),
            4.5,
        );
        assert_eq!(uniform.position, [1.0, 2.0, 3.0, 4.5]);
        assert_eq!(uniform.view_proj[2][2], 1.0);
    }

    #[test]
    fn test_model_matrices_are_strided() {
        let models = [
            Matrix4::identity(),
            Matrix4::from_translation(Vector3::new(32.0, 0.0, -64.0)),
        ];
        let bytes = pack_model_matrices(&models);
        assert_eq!(bytes.len(), 2 * MODEL_UNIFORM_STRIDE as usize);

        let second: Vec<f32> = bytes[256..256 + 64]
            .chunks_exact(4)
            .map(|word| f32::from_ne_bytes([word[0], word[1], word[2], word[3]]))
            .collect();
        assert_eq!(&second[12..16], &[32.0, 0.0, -64.0, 1.0]);
        assert!(bytes[64..256].iter().all(|byte| *byte == 0));
    }
}
