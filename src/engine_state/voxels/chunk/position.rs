//! # Chunk Position
//!
//! The key of the world's chunk map and the arithmetic that splits world voxel
//! coordinates into a chunk and a local offset.

use cgmath::{EuclideanSpace, Point3, Vector3};

use crate::engine_state::voxels::block::block_side::BlockSide;

use super::CHUNK_DIMENSION;

/// Integer coordinates of a chunk, in units of whole chunks.
///
/// Two positions are equal iff all three components are equal, and hashing
/// covers exactly those three integers. Ordering is lexicographic on
/// (x, y, z), which gives every chunk iteration in the world a stable order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPosition {
    /// Chunk index along X
    pub x: i32,
    /// Chunk index along Y
    pub y: i32,
    /// Chunk index along Z
    pub z: i32,
}

impl ChunkPosition {
    /// Creates a chunk position from its three components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Splits a world voxel coordinate into its chunk and local offset.
    ///
    /// Uses floor division and the Euclidean remainder, so negative
    /// coordinates land in the chunk below with a local offset in
    /// `0..CHUNK_DIMENSION`.
    ///
    /// # Arguments
    /// * `voxel` - A voxel coordinate in world space
    ///
    /// # Returns
    /// The owning chunk position and the local coordinate within that chunk.
    pub fn from_voxel(voxel: Point3<i32>) -> (Self, Point3<i32>) {
        let position = Self::new(
            voxel.x.div_euclid(CHUNK_DIMENSION),
            voxel.y.div_euclid(CHUNK_DIMENSION),
            voxel.z.div_euclid(CHUNK_DIMENSION),
        );
        let local = Point3::new(
            voxel.x.rem_euclid(CHUNK_DIMENSION),
            voxel.y.rem_euclid(CHUNK_DIMENSION),
            voxel.z.rem_euclid(CHUNK_DIMENSION),
        );
        (position, local)
    }

    /// The chunk containing a point in continuous world space.
    pub fn containing(point: Point3<f32>) -> Self {
        let voxel = Point3::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        );
        Self::from_voxel(voxel).0
    }

    /// World coordinate of the chunk's minimum corner voxel.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(
            self.x * CHUNK_DIMENSION,
            self.y * CHUNK_DIMENSION,
            self.z * CHUNK_DIMENSION,
        )
    }

    /// Converts a local coordinate of this chunk back into world space.
    pub fn to_world(&self, local: Point3<i32>) -> Point3<i32> {
        self.origin() + local.to_vec()
    }

    /// Center of the chunk in continuous world space.
    pub fn center(&self) -> Point3<f32> {
        let half = CHUNK_DIMENSION as f32 * 0.5;
        let origin = self.origin();
        Point3::new(origin.x as f32, origin.y as f32, origin.z as f32) + Vector3::new(half, half, half)
    }

    /// The chunk one step away through the given face.
    pub fn neighbor(&self, side: BlockSide) -> Self {
        let normal = side.normal();
        Self::new(self.x + normal.x, self.y + normal.y, self.z + normal.z)
    }

    /// The six face-adjacent chunk positions, in `BlockSide` order.
    pub fn neighbors(&self) -> [(BlockSide, ChunkPosition); 6] {
        BlockSide::all().map(|side| (side, self.neighbor(side)))
    }
}
