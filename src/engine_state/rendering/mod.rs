//! Rendering system for the voxel explorer.
//!
//! Everything above the [`GraphicsBackend`] seam is plain CPU work: chunk
//! meshing, the water plane, the voxel marker and the scene that orders them.
//! Only [`WgpuBackend`] and its pipeline, bind group and texture helpers talk
//! to the GPU.

pub mod backend;
mod bind_group_state;
pub mod material;
pub mod meshing;
mod pipeline_manager;
pub mod scene;
mod texture;
mod vertex;
pub mod voxel_marker;
pub mod water;
mod wgpu_backend;

pub use backend::{DrawPass, GraphicsBackend, HeadlessBackend, MeshHandle};
pub use scene::Scene;
pub use texture::build_atlas_image;
pub use vertex::Vertex;
pub use wgpu_backend::WgpuBackend;
