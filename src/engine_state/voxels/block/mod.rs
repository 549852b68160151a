//! # Block Module
//!
//! Voxel identifiers and the faces of a voxel cube. Voxels are stored as raw
//! `BlockTypeSize` values; `BlockType` gives the known palette entries a name.

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent voxel IDs in memory.
pub type BlockTypeSize = u8;

/// The voxel ID of empty space.
pub const AIR: BlockTypeSize = 0;

/// Returns `true` for every voxel ID that occupies space.
///
/// Out-of-palette IDs are still solid; they only lack a texture.
#[inline]
pub fn is_solid(id: BlockTypeSize) -> bool {
    id != AIR
}
