//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed 32x32x32 cuboid of voxel
//! IDs together with the bookkeeping the world needs to keep its mesh current.
//!
//! ## Storage
//!
//! Voxels are stored densely, one `BlockTypeSize` per voxel, at index
//! `x + CHUNK_DIMENSION * y + CHUNK_PLANE_SIZE * z`. Iteration in storage order
//! therefore walks x fastest, then y, then z.
//!
//! ## Mesh Lifecycle
//!
//! A chunk owns at most one mesh. Any voxel change through [`Chunk::set`] marks
//! it dirty; installing a rebuilt mesh with [`Chunk::set_mesh`] clears the flag
//! and stamps the mesh with a revision taken from the owning world, which is
//! what the renderer watches to know when GPU buffers must be replaced.

use cgmath::Point3;

use crate::{
    engine_state::{
        rendering::meshing::Mesh,
        voxels::block::{block_side::BlockSide, is_solid, BlockTypeSize, AIR},
    },
    error::VoxelError,
};

pub mod chunk_iteration;
mod position;

pub use chunk_iteration::ChunkVoxelIterator;
pub use position::ChunkPosition;

/// The dimension (width, height, depth) of a chunk in voxels.
pub const CHUNK_DIMENSION: i32 = 32;
/// The number of voxels in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of voxels in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// The dimension of a chunk including an extra layer of voxels on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = (CHUNK_DIMENSION + 2) as usize;
/// The number of voxels in a wrapped 2D chunk plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of voxels in a wrapped chunk.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// Radius of the sphere enclosing a chunk, used for frustum tests.
pub const CHUNK_SPHERE_RADIUS: f32 = CHUNK_DIMENSION as f32 * 0.5 * 1.732_050_8;

/// A 32x32x32 block of voxel IDs owned by the world.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    position: ChunkPosition,
    /// Dense voxel storage in `x + N*y + N²*z` order.
    voxels: Box<[BlockTypeSize]>,
    /// Number of non-air voxels, kept in step with `voxels`.
    solid_count: usize,
    /// Set when the stored mesh no longer matches the voxels or neighbours.
    dirty: bool,
    /// Set once a player edit changed this chunk; edited chunks are never evicted.
    edited: bool,
    /// The last mesh built for this chunk, `None` while unbuilt or empty.
    mesh: Option<Mesh>,
    /// Incremented every time `mesh` is replaced.
    mesh_revision: u64,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all voxels are air).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn empty(position: ChunkPosition) -> Self {
        Self::from_voxels(position, vec![AIR; CHUNK_SIZE as usize])
    }

    /// Creates a chunk where every voxel holds `id`.
    pub fn filled(position: ChunkPosition, id: BlockTypeSize) -> Self {
        Self::from_voxels(position, vec![id; CHUNK_SIZE as usize])
    }

    /// Wraps already generated voxel data in a chunk.
    ///
    /// The chunk starts dirty so that its first mesh gets built.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `voxels` - Exactly `CHUNK_SIZE` IDs in storage order; shorter data is padded with air
    pub fn from_voxels(position: ChunkPosition, mut voxels: Vec<BlockTypeSize>) -> Self {
        debug_assert_eq!(voxels.len(), CHUNK_SIZE as usize);
        voxels.resize(CHUNK_SIZE as usize, AIR);
        let solid_count = voxels.iter().filter(|id| is_solid(**id)).count();

        Self {
            position,
            voxels: voxels.into_boxed_slice(),
            solid_count,
            dirty: true,
            edited: false,
            mesh: None,
            mesh_revision: 0,
        }
    }

    /// Storage index of an in-bounds local coordinate.
    #[inline]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_DIMENSION as usize * y + CHUNK_PLANE_SIZE as usize * z
    }

    fn checked_index(local: Point3<i32>) -> Result<usize, VoxelError> {
        let range = 0..CHUNK_DIMENSION;
        if range.contains(&local.x) && range.contains(&local.y) && range.contains(&local.z) {
            Ok(Self::index(local.x as usize, local.y as usize, local.z as usize))
        } else {
            Err(VoxelError::OutOfBounds {
                position: local,
                extent: CHUNK_DIMENSION,
            })
        }
    }

    /// Reads the voxel at a local coordinate.
    ///
    /// # Returns
    /// The voxel ID, or `VoxelError::OutOfBounds` if any component lies outside `0..CHUNK_DIMENSION`.
    pub fn get(&self, local: Point3<i32>) -> Result<BlockTypeSize, VoxelError> {
        Ok(self.voxels[Self::checked_index(local)?])
    }

    /// Writes the voxel at a local coordinate.
    ///
    /// The chunk is marked dirty only when the stored value actually changes.
    ///
    /// # Returns
    /// The previous voxel ID, or `VoxelError::OutOfBounds`.
    pub fn set(&mut self, local: Point3<i32>, id: BlockTypeSize) -> Result<BlockTypeSize, VoxelError> {
        let index = Self::checked_index(local)?;
        let previous = self.voxels[index];
        if previous != id {
            match (is_solid(previous), is_solid(id)) {
                (false, true) => self.solid_count += 1,
                (true, false) => self.solid_count -= 1,
                _ => {}
            }
            self.voxels[index] = id;
            self.dirty = true;
        }
        Ok(previous)
    }

    /// The raw voxel storage in storage order.
    pub fn voxels(&self) -> &[BlockTypeSize] {
        &self.voxels
    }

    /// The position of this chunk.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// `true` when the chunk holds no solid voxel and therefore never needs a mesh.
    pub fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    /// `true` while the mesh is out of date.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags the mesh as out of date, e.g. after a neighbour changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// `true` once a player edit changed this chunk.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Pins the chunk against eviction.
    pub fn mark_edited(&mut self) {
        self.edited = true;
    }

    /// The current mesh, if one has been built and the chunk is not empty.
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Revision of the current mesh, 0 before the first `set_mesh`.
    pub fn mesh_revision(&self) -> u64 {
        self.mesh_revision
    }

    /// Installs a freshly built mesh and clears the dirty flag.
    ///
    /// `revision` must be unique across the world so a regenerated chunk never
    /// repeats the revision of the chunk it replaced.
    pub fn set_mesh(&mut self, mesh: Option<Mesh>, revision: u64) {
        self.mesh = mesh;
        self.mesh_revision = revision;
        self.dirty = false;
    }

    /// Copies the layer of voxels touching the given face of the chunk.
    ///
    /// The layer is indexed `a + CHUNK_DIMENSION * b`, where (a, b) are the two
    /// remaining axes in ascending order: (y, z) for X faces, (x, z) for Y faces
    /// and (x, y) for Z faces.
    pub fn boundary_layer(&self, side: BlockSide) -> Box<[BlockTypeSize]> {
        let n = CHUNK_DIMENSION as usize;
        let fixed = if side.is_positive() { n - 1 } else { 0 };
        let mut layer = vec![AIR; n * n];
        for b in 0..n {
            for a in 0..n {
                let index = match side.axis() {
                    0 => Self::index(fixed, a, b),
                    1 => Self::index(a, fixed, b),
                    _ => Self::index(a, b, fixed),
                };
                layer[a + n * b] = self.voxels[index];
            }
        }
        layer.into_boxed_slice()
    }

    /// Iterates over the solid voxels of this chunk in storage order.
    pub fn iter_solid(&self) -> ChunkVoxelIterator<'_> {
        ChunkVoxelIterator::new(self)
    }

    /// Center of the chunk in world space.
    pub fn center(&self) -> Point3<f32> {
        self.position.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_round_trip() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        assert_eq!(chunk.set(Point3::new(3, 4, 5), 4), Ok(0));
        assert_eq!(chunk.get(Point3::new(3, 4, 5)), Ok(4));
        assert_eq!(chunk.solid_count(), 1);
        assert_eq!(chunk.set(Point3::new(3, 4, 5), 0), Ok(4));
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        let outside = Point3::new(CHUNK_DIMENSION, 0, 0);
        assert_eq!(
            chunk.get(outside),
            Err(VoxelError::OutOfBounds {
                position: outside,
                extent: CHUNK_DIMENSION
            })
        );
        assert!(chunk.set(Point3::new(0, -1, 0), 1).is_err());
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_dirty_only_on_change() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        chunk.set_mesh(None, 1);
        assert!(!chunk.is_dirty());

        chunk.set(Point3::new(0, 0, 0), 0).unwrap();
        assert!(!chunk.is_dirty());

        chunk.set(Point3::new(0, 0, 0), 2).unwrap();
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_set_mesh_records_revision() {
        let mut chunk = Chunk::filled(ChunkPosition::default(), 1);
        assert!(chunk.is_dirty());
        assert_eq!(chunk.mesh_revision(), 0);
        chunk.set_mesh(Some(Mesh::new()), 7);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.mesh_revision(), 7);
    }

    #[test]
    fn test_boundary_layer_indexing() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        chunk.set(Point3::new(31, 2, 7), 5).unwrap();
        chunk.set(Point3::new(4, 0, 9), 6).unwrap();
        chunk.set(Point3::new(1, 3, 31), 7).unwrap();

        let n = CHUNK_DIMENSION as usize;
        assert_eq!(chunk.boundary_layer(BlockSide::BACK)[2 + n * 7], 5);
        assert_eq!(chunk.boundary_layer(BlockSide::FRONT)[2 + n * 7], 0);
        assert_eq!(chunk.boundary_layer(BlockSide::BOTTOM)[4 + n * 9], 6);
        assert_eq!(chunk.boundary_layer(BlockSide::RIGHT)[1 + n * 3], 7);
    }
}
