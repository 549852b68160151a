//! The water plane.
//!
//! One large quad at sea level that follows the player in whole-chunk steps,
//! so it always covers the loaded terrain without its pattern sliding around.

use cgmath::{Matrix4, Point3, Vector3};
use log::debug;

use super::{
    backend::{DrawPass, GraphicsBackend, MeshHandle},
    meshing::Mesh,
    vertex::Vertex,
};
use crate::{
    config::EngineConfig,
    engine_state::voxels::{block::block_side::BlockSide, chunk::CHUNK_DIMENSION},
};

/// A horizontal water quad centred under the camera.
#[derive(Debug)]
pub struct Water {
    level: f32,
    extent: f32,
    handle: Option<MeshHandle>,
}

impl Water {
    /// Creates the plane at `level` with side length `extent`. Nothing is uploaded yet.
    pub fn new(level: f32, extent: f32) -> Self {
        Self {
            level,
            extent,
            handle: None,
        }
    }

    /// Creates the plane from the configured water level and extent.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.water_level, config.water_extent)
    }

    /// Height of the water surface.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// The quad, centred on the origin at height 0.
    ///
    /// Texture coordinates run in voxel units so the water shader can tile freely.
    pub fn mesh(&self) -> Mesh {
        let half = self.extent * 0.5;
        let corner = |x: f32, z: f32| {
            Vertex::new(
                [x, 0.0, z],
                [x + half, z + half],
                0,
                BlockSide::TOP as u32,
                1.0,
            )
        };

        let mut mesh = Mesh::new();
        mesh.push_quad(
            [
                corner(-half, -half),
                corner(-half, half),
                corner(half, -half),
                corner(half, half),
            ],
            false,
        );
        mesh
    }

    /// Model matrix for a camera at `camera_position`.
    ///
    /// The plane is snapped to the chunk grid on X and Z.
    pub fn transform(&self, camera_position: Point3<f32>) -> Matrix4<f32> {
        let size = CHUNK_DIMENSION as f32;
        let snap = |value: f32| (value / size).floor() * size;
        Matrix4::from_translation(Vector3::new(
            snap(camera_position.x),
            self.level,
            snap(camera_position.z),
        ))
    }

    /// Uploads the quad on first use and queues its draw.
    pub fn draw(&mut self, camera_position: Point3<f32>, backend: &mut dyn GraphicsBackend) {
        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = backend.upload_mesh(&self.mesh());
                debug!("Uploaded water plane at level {}", self.level);
                self.handle = Some(handle);
                handle
            }
        };
        backend.draw(handle, self.transform(camera_position), DrawPass::Water);
    }
}
