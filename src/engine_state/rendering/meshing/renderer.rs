//! Keeps backend copies of chunk meshes in step with the world.
//!
//! Chunks own their CPU meshes and carry a world-unique revision for each one
//! installed. The renderer remembers which revision each uploaded handle holds
//! and re-uploads only when that number moves, so a frame without rebuilds
//! costs no uploads at all.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};
use log::trace;

use crate::engine_state::{
    rendering::backend::{DrawPass, GraphicsBackend, MeshHandle},
    voxels::{chunk::ChunkPosition, world::World},
};

/// Tracks the uploaded mesh of every chunk.
#[derive(Debug, Default)]
pub struct ChunkMeshRenderer {
    /// Uploaded handle and the mesh revision it was built from
    uploaded: HashMap<ChunkPosition, (MeshHandle, u64)>,
}

impl ChunkMeshRenderer {
    /// Creates a renderer with nothing uploaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads changed chunk meshes and releases stale ones.
    ///
    /// Handles are released for chunks that were evicted or whose mesh became
    /// empty. Work is done in ascending chunk position order.
    pub fn sync(&mut self, world: &World, backend: &mut dyn GraphicsBackend) {
        let mut stale: Vec<ChunkPosition> = self
            .uploaded
            .keys()
            .filter(|position| world.chunk(**position).and_then(|chunk| chunk.mesh()).is_none())
            .copied()
            .collect();
        stale.sort_unstable();

        for position in stale {
            if let Some((handle, _)) = self.uploaded.remove(&position) {
                trace!("Releasing mesh of chunk {position:?}");
                backend.release_mesh(handle);
            }
        }

        for chunk in world.chunks_sorted() {
            let Some(mesh) = chunk.mesh() else {
                continue;
            };
            let position = chunk.position();
            let revision = chunk.mesh_revision();

            match self.uploaded.get(&position) {
                Some((_, uploaded_revision)) if *uploaded_revision == revision => {}
                previous => {
                    if let Some((handle, _)) = previous {
                        backend.release_mesh(*handle);
                    }
                    let handle = backend.upload_mesh(mesh);
                    trace!("Uploaded mesh of chunk {position:?} at revision {revision}");
                    self.uploaded.insert(position, (handle, revision));
                }
            }
        }
    }

    /// Draws the uploaded meshes of the given chunks, translated to their origins.
    pub fn draw(&self, visible: &[ChunkPosition], backend: &mut dyn GraphicsBackend) {
        for position in visible {
            if let Some((handle, _)) = self.uploaded.get(position) {
                let origin = position.origin();
                let translation = Vector3::new(origin.x as f32, origin.y as f32, origin.z as f32);
                backend.draw(*handle, Matrix4::from_translation(translation), DrawPass::Terrain);
            }
        }
    }

    /// The handle currently uploaded for a chunk.
    pub fn handle(&self, position: ChunkPosition) -> Option<MeshHandle> {
        self.uploaded.get(&position).map(|(handle, _)| *handle)
    }

    /// Number of chunks with an uploaded mesh.
    pub fn uploaded_count(&self) -> usize {
        self.uploaded.len()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::{
        config::{EngineConfig, GenerationMethod, RebuildPolicy},
        engine_state::rendering::{backend::HeadlessBackend, material::TextureAtlas},
    };

    fn empty_world() -> World {
        World::new(&EngineConfig {
            generation_method: GenerationMethod::Empty,
            rebuild_policy: RebuildPolicy::All,
            ..Default::default()
        })
    }

    #[test]
    fn test_sync_uploads_once_per_revision() {
        let atlas = TextureAtlas::default();
        let mut world = empty_world();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ChunkMeshRenderer::new();

        world.set_voxel(Point3::new(1, 1, 1), 4);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);
        renderer.sync(&world, &mut backend);
        assert_eq!(backend.live_mesh_count(), 1);
        assert_eq!(backend.calls().len(), 1);

        world.set_voxel(Point3::new(2, 1, 1), 4);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);
        assert_eq!(backend.live_mesh_count(), 1);
        assert_eq!(backend.calls().len(), 3);
    }

    #[test]
    fn test_emptied_chunk_is_released() {
        let atlas = TextureAtlas::default();
        let mut world = empty_world();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ChunkMeshRenderer::new();

        world.set_voxel(Point3::new(1, 1, 1), 4);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);
        assert_eq!(renderer.uploaded_count(), 1);

        world.set_voxel(Point3::new(1, 1, 1), 0);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);
        assert_eq!(renderer.uploaded_count(), 0);
        assert_eq!(backend.live_mesh_count(), 0);
    }

    #[test]
    fn test_regenerated_chunk_replaces_stale_upload() {
        let atlas = TextureAtlas::default();
        let mut world = World::new(&EngineConfig {
            generation_method: GenerationMethod::Solid,
            rebuild_policy: RebuildPolicy::All,
            render_distance: 1,
            min_chunk_y: 0,
            max_chunk_y: 0,
            max_resident_chunks: 0,
            ..Default::default()
        });
        let mut backend = HeadlessBackend::new();
        let mut renderer = ChunkMeshRenderer::new();
        let position = ChunkPosition::new(10, 0, 0);

        world.ensure_chunk(position);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);
        let first = renderer.handle(position);
        assert!(first.is_some());

        // Evicted and regenerated with no sync in between.
        assert_eq!(world.evict(ChunkPosition::new(0, 0, 0)), vec![position]);
        world.ensure_chunk(position);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);

        assert_eq!(backend.live_mesh_count(), 1);
        assert_ne!(renderer.handle(position), first);
    }

    #[test]
    fn test_draw_translates_to_chunk_origin() {
        let atlas = TextureAtlas::default();
        let mut world = empty_world();
        let mut backend = HeadlessBackend::new();
        let mut renderer = ChunkMeshRenderer::new();

        world.set_voxel(Point3::new(33, 1, -1), 4);
        world.update(&atlas);
        renderer.sync(&world, &mut backend);

        let position = ChunkPosition::new(1, 0, -1);
        renderer.draw(&[position, ChunkPosition::new(5, 5, 5)], &mut backend);
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(Some(draws[0].0), renderer.handle(position));
        assert_eq!(draws[0].1, Matrix4::from_translation(Vector3::new(32.0, 0.0, -32.0)));
    }
}
