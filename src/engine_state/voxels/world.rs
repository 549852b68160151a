//! # World Module
//!
//! This module provides the `World` struct which owns every resident chunk of
//! the voxel world and is the only way to read or edit voxels by world
//! coordinate.
//!
//! ## Architecture
//!
//! The world is sparse: only chunks inside the load radius around the player,
//! plus any chunk the player has edited, are kept in memory. Chunks never
//! reference each other; anything that needs a neighbour (meshing, dirty
//! propagation) looks it up here by [`ChunkPosition`].
//!
//! ## Frame Work
//!
//! - [`World::stream_around`] generates missing chunks nearest first, a few per
//!   call, and evicts the least recently visible chunks once over capacity.
//! - [`World::update`] rebuilds dirty meshes under the configured
//!   [`RebuildPolicy`], always in ascending chunk position order.

use std::collections::HashMap;

use cgmath::Point3;
use log::debug;
use lru::LruCache;

use crate::{
    config::{EngineConfig, RebuildPolicy},
    engine_state::{
        camera_state::Frustum,
        rendering::{
            material::MaterialSource,
            meshing::{build_mesh, NeighborBoundaries},
        },
        voxels::{
            block::{block_side::BlockSide, is_solid, BlockTypeSize, AIR},
            chunk::{Chunk, ChunkPosition, CHUNK_DIMENSION, CHUNK_SPHERE_RADIUS},
            terrain::TerrainGenerator,
        },
    },
};

/// Represents a voxel world composed of multiple chunks.
pub struct World {
    /// Resident chunks by position.
    chunks: HashMap<ChunkPosition, Chunk>,
    /// Source of new chunks.
    generator: TerrainGenerator,
    /// Resident positions, most recently visible first.
    recency: LruCache<ChunkPosition, ()>,
    /// The chunk the player was in at the last streaming call.
    center: Option<ChunkPosition>,
    render_distance: i32,
    min_chunk_y: i32,
    max_chunk_y: i32,
    generation_budget: usize,
    rebuild_policy: RebuildPolicy,
    max_resident_chunks: usize,
    /// Last mesh revision handed out; shared by every chunk ever resident.
    mesh_revision: u64,
}

impl World {
    /// Creates a world with no chunks, generating with the configured terrain.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_generator(config, TerrainGenerator::from_config(config))
    }

    /// Creates a world with no chunks and a custom generator.
    pub fn with_generator(config: &EngineConfig, generator: TerrainGenerator) -> Self {
        World {
            chunks: HashMap::new(),
            generator,
            recency: LruCache::unbounded(),
            center: None,
            render_distance: config.render_distance.min(i32::MAX as u32) as i32,
            min_chunk_y: config.min_chunk_y,
            max_chunk_y: config.max_chunk_y,
            generation_budget: config.generation_budget,
            rebuild_policy: config.rebuild_policy,
            max_resident_chunks: config.max_resident_chunks,
            mesh_revision: 0,
        }
    }

    /// Reads the voxel at a world coordinate.
    ///
    /// # Returns
    /// The voxel ID, or air if the chunk holding it is not resident.
    pub fn get_voxel(&self, voxel: Point3<i32>) -> BlockTypeSize {
        let (position, local) = ChunkPosition::from_voxel(voxel);
        let Some(chunk) = self.chunks.get(&position) else {
            return AIR;
        };
        match chunk.get(local) {
            Ok(id) => id,
            Err(err) => {
                debug_assert!(false, "decomposed coordinate rejected: {err}");
                AIR
            }
        }
    }

    /// Returns `true` if the voxel at a world coordinate is solid.
    pub fn is_solid_at(&self, voxel: Point3<i32>) -> bool {
        is_solid(self.get_voxel(voxel))
    }

    /// Writes a voxel at a world coordinate.
    ///
    /// The chunk is generated first if it is not resident. When the stored value
    /// changes, the chunk is marked dirty and edited, and every resident face
    /// neighbour whose boundary touches the voxel is marked dirty too.
    ///
    /// # Returns
    /// The voxel ID that was stored before
    pub fn set_voxel(&mut self, voxel: Point3<i32>, id: BlockTypeSize) -> BlockTypeSize {
        let (position, local) = ChunkPosition::from_voxel(voxel);
        self.ensure_chunk(position);

        let Some(chunk) = self.chunks.get_mut(&position) else {
            return AIR;
        };
        let previous = match chunk.set(local, id) {
            Ok(previous) => previous,
            Err(err) => {
                debug_assert!(false, "decomposed coordinate rejected: {err}");
                return AIR;
            }
        };
        if previous == id {
            return previous;
        }
        chunk.mark_edited();

        let last = CHUNK_DIMENSION - 1;
        for side in BlockSide::all() {
            let edge = if side.is_positive() { last } else { 0 };
            if local[side.axis()] != edge {
                continue;
            }
            if let Some(neighbor) = self.chunks.get_mut(&position.neighbor(side)) {
                neighbor.mark_dirty();
            }
        }

        previous
    }

    /// Generates the chunk at `position` unless it is already resident.
    ///
    /// # Returns
    /// `true` if a chunk was generated
    pub fn ensure_chunk(&mut self, position: ChunkPosition) -> bool {
        if self.chunks.contains_key(&position) {
            return false;
        }

        let chunk = self.generator.fill_chunk(position);
        debug!(
            "Generated chunk {:?} with {} solid voxels",
            position,
            chunk.solid_count()
        );
        self.chunks.insert(position, chunk);
        self.recency.put(position, ());
        // Neighbours meshed their shared border as exposed.
        self.mark_neighbors_dirty(position);
        true
    }

    fn mark_neighbors_dirty(&mut self, position: ChunkPosition) {
        for (_, neighbor) in position.neighbors() {
            if let Some(chunk) = self.chunks.get_mut(&neighbor) {
                chunk.mark_dirty();
            }
        }
    }

    fn in_load_radius(&self, position: ChunkPosition, center: ChunkPosition) -> bool {
        let dx = position.x - center.x;
        let dz = position.z - center.z;
        dx * dx + dz * dz <= self.render_distance * self.render_distance
            && (self.min_chunk_y..=self.max_chunk_y).contains(&position.y)
    }

    /// Generates missing chunks around the player and evicts surplus ones.
    ///
    /// At most `generation_budget` chunks are generated per call, nearest to
    /// the player's chunk first with ties broken by position.
    ///
    /// # Returns
    /// The number of chunks generated
    pub fn stream_around(&mut self, player_position: Point3<f32>) -> usize {
        let center = ChunkPosition::containing(player_position);
        self.center = Some(center);

        let r = self.render_distance;
        let mut missing = Vec::new();
        for dx in -r..=r {
            for dz in -r..=r {
                for y in self.min_chunk_y..=self.max_chunk_y {
                    let position = ChunkPosition::new(center.x + dx, y, center.z + dz);
                    if self.in_load_radius(position, center) && !self.chunks.contains_key(&position) {
                        missing.push(position);
                    }
                }
            }
        }

        let distance = |position: &ChunkPosition| {
            let (dx, dy, dz) = (
                i64::from(position.x - center.x),
                i64::from(position.y - center.y),
                i64::from(position.z - center.z),
            );
            dx * dx + dy * dy + dz * dz
        };
        missing.sort_by_key(|position| (distance(position), *position));

        let mut generated = 0;
        for position in missing.into_iter().take(self.generation_budget) {
            if self.ensure_chunk(position) {
                generated += 1;
            }
        }

        self.evict(center);
        generated
    }

    /// Evicts least recently visible chunks until the resident count fits the cap.
    ///
    /// Edited chunks and chunks inside the load radius are never evicted.
    ///
    /// # Returns
    /// The evicted positions, in eviction order
    pub fn evict(&mut self, center: ChunkPosition) -> Vec<ChunkPosition> {
        let surplus = self.chunks.len().saturating_sub(self.max_resident_chunks);
        if surplus == 0 {
            return Vec::new();
        }

        let victims: Vec<ChunkPosition> = self
            .recency
            .iter()
            .rev()
            .map(|(position, _)| *position)
            .filter(|position| {
                !self.in_load_radius(*position, center)
                    && self.chunks.get(position).is_some_and(|chunk| !chunk.is_edited())
            })
            .take(surplus)
            .collect();

        for position in &victims {
            self.chunks.remove(position);
            self.recency.pop(position);
            self.mark_neighbors_dirty(*position);
            debug!("Evicted chunk {position:?}");
        }

        victims
    }

    /// Rebuilds dirty meshes under the rebuild policy.
    ///
    /// Dirty chunks are visited in ascending position order. Empty chunks just
    /// drop their mesh and do not count against a budget.
    ///
    /// # Returns
    /// The number of meshes built
    pub fn update(&mut self, materials: &dyn MaterialSource) -> usize {
        let budget = match self.rebuild_policy {
            RebuildPolicy::All => usize::MAX,
            RebuildPolicy::Budget(budget) => budget,
        };

        let mut built = 0;
        for position in self.dirty_chunks() {
            let mesh = match self.chunks.get(&position) {
                Some(chunk) if chunk.is_empty() => None,
                Some(chunk) => {
                    if built >= budget {
                        continue;
                    }
                    built += 1;
                    let boundaries = self.neighbor_boundaries(position);
                    Some(build_mesh(chunk, &boundaries, materials)).filter(|mesh| !mesh.is_empty())
                }
                None => continue,
            };

            self.mesh_revision += 1;
            if let Some(chunk) = self.chunks.get_mut(&position) {
                chunk.set_mesh(mesh, self.mesh_revision);
            }
        }

        built
    }

    /// The boundary layers of the six chunks adjacent to `position`.
    pub fn neighbor_boundaries(&self, position: ChunkPosition) -> NeighborBoundaries {
        let mut boundaries = NeighborBoundaries::new();
        for (side, neighbor) in position.neighbors() {
            if let Some(chunk) = self.chunks.get(&neighbor) {
                boundaries.set(side, chunk.boundary_layer(side.opposite()));
            }
        }
        boundaries
    }

    /// Positions of chunks that may be seen, in ascending order.
    ///
    /// A chunk is visible when its bounding sphere meets the frustum and it
    /// lies within the render distance of the camera's chunk on the xz grid.
    pub fn visible_chunk_positions(&self, frustum: &Frustum) -> Vec<ChunkPosition> {
        let camera_chunk = ChunkPosition::containing(frustum.position());
        let r = self.render_distance;
        let mut visible: Vec<ChunkPosition> = self
            .chunks
            .values()
            .filter(|chunk| {
                let position = chunk.position();
                let (dx, dz) = (position.x - camera_chunk.x, position.z - camera_chunk.z);
                dx * dx + dz * dz <= r * r && frustum.contains_sphere(chunk.center(), CHUNK_SPHERE_RADIUS)
            })
            .map(Chunk::position)
            .collect();
        visible.sort_unstable();
        visible
    }

    /// The visible chunks, in ascending position order.
    pub fn visible_chunks(&self, frustum: &Frustum) -> Vec<&Chunk> {
        self.visible_chunk_positions(frustum)
            .into_iter()
            .filter_map(|position| self.chunks.get(&position))
            .collect()
    }

    /// Marks chunks as recently visible so eviction picks them last.
    pub fn touch(&mut self, positions: &[ChunkPosition]) {
        for position in positions {
            self.recency.promote(position);
        }
    }

    /// Positions of every dirty chunk, in ascending order.
    pub fn dirty_chunks(&self) -> Vec<ChunkPosition> {
        let mut dirty: Vec<ChunkPosition> = self
            .chunks
            .values()
            .filter(|chunk| chunk.is_dirty())
            .map(Chunk::position)
            .collect();
        dirty.sort_unstable();
        dirty
    }

    /// The resident chunk at `position`.
    pub fn chunk(&self, position: ChunkPosition) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Every resident chunk, in ascending position order.
    pub fn chunks_sorted(&self) -> Vec<&Chunk> {
        let mut chunks: Vec<&Chunk> = self.chunks.values().collect();
        chunks.sort_unstable_by_key(|chunk| chunk.position());
        chunks
    }

    /// Returns `true` if a chunk is resident at `position`.
    pub fn contains(&self, position: ChunkPosition) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The chunk the player was in at the last streaming call.
    pub fn center(&self) -> Option<ChunkPosition> {
        self.center
    }
}
