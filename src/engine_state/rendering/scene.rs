//! # Scene
//!
//! Everything that gets drawn, and the order it is drawn in.
//!
//! The scene owns the world and the voxel handler side by side; the marker
//! and the water are pure presentation and only read from them.

use log::trace;

use super::{
    backend::GraphicsBackend, material::TextureAtlas, meshing::ChunkMeshRenderer,
    voxel_marker::VoxelMarker, water::Water,
};
use crate::{
    config::EngineConfig,
    engine_state::{
        camera_state::{camera::Camera, CameraState, Frustum, PlayerBody},
        voxels::{voxel_handler::VoxelHandler, world::World},
    },
};

/// How much work one scene update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneUpdate {
    /// Chunks generated this frame
    pub generated: usize,
    /// Chunk meshes rebuilt this frame
    pub rebuilt: usize,
    /// Chunks inside the view frustum
    pub visible: usize,
}

/// The world plus everything drawn on top of it.
pub struct Scene {
    world: World,
    voxel_handler: VoxelHandler,
    voxel_marker: VoxelMarker,
    water: Water,
    chunk_renderer: ChunkMeshRenderer,
    materials: TextureAtlas,
}

impl Scene {
    /// Creates the scene from the engine settings.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_world(config, World::new(config))
    }

    /// Creates the scene around an existing world.
    pub fn with_world(config: &EngineConfig, world: World) -> Self {
        Self {
            world,
            voxel_handler: VoxelHandler::new(config.max_reach),
            voxel_marker: VoxelMarker::new(),
            water: Water::from_config(config),
            chunk_renderer: ChunkMeshRenderer::new(),
            materials: TextureAtlas::default(),
        }
    }

    /// The voxel world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The voxel world, for direct edits.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The picking and editing state.
    pub fn voxel_handler(&self) -> &VoxelHandler {
        &self.voxel_handler
    }

    /// The picking and editing state, for mode and material changes.
    pub fn voxel_handler_mut(&mut self) -> &mut VoxelHandler {
        &mut self.voxel_handler
    }

    /// The atlas layout chunk meshes are textured from.
    pub fn materials(&self) -> &TextureAtlas {
        &self.materials
    }

    /// Advances the world one frame.
    ///
    /// Streams chunks around the camera, rebuilds dirty meshes, refreshes the
    /// recency of visible chunks and re-picks the target.
    pub fn update(&mut self, camera: &Camera, frustum: &Frustum) -> SceneUpdate {
        let generated = self.world.stream_around(camera.position);
        let rebuilt = self.world.update(&self.materials);
        let visible = self.world.visible_chunk_positions(frustum);
        self.world.touch(&visible);
        self.voxel_handler.update(camera, &self.world);

        let update = SceneUpdate {
            generated,
            rebuilt,
            visible: visible.len(),
        };
        trace!("Scene update: {update:?}");
        update
    }

    /// Performs the current edit mode on the targeted voxel.
    ///
    /// # Returns
    /// `true` if the world changed
    pub fn apply_action(&mut self, camera: &Camera, body: &PlayerBody) -> bool {
        self.voxel_handler.apply_action(camera, &mut self.world, body)
    }

    /// Queues one frame: visible chunks, then water, then the marker.
    pub fn render(&mut self, backend: &mut dyn GraphicsBackend, camera_state: &CameraState, seconds: f32) {
        backend.set_time(seconds);
        backend.set_camera(camera_state.view_matrix(), camera_state.projection_matrix());

        self.chunk_renderer.sync(&self.world, backend);
        let visible = self.world.visible_chunk_positions(&camera_state.frustum());
        self.chunk_renderer.draw(&visible, backend);

        self.water.draw(camera_state.camera.position, backend);
        self.voxel_marker.draw(&self.voxel_handler, backend);
    }
}
