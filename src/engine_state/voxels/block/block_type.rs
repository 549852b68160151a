//! # Block Type Module
//!
//! The named materials of the texture palette and conversions from raw voxel IDs.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates the materials of the palette.
///
/// The discriminant of each variant is the voxel ID stored in chunks and the
/// row of the material in the texture atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    AIR = 0,
    /// Beaches and lowlands below the grass line.
    SAND = 1,
    /// Grass with a green top and dirt-coloured sides.
    GRASS = 2,
    /// Plain dirt, also placed under tree trunks.
    DIRT = 3,
    /// Bare rock, the fill of every column below its surface.
    STONE = 4,
    /// Mountain caps.
    SNOW = 5,
    /// Tree crowns.
    LEAVES = 6,
    /// Tree trunks.
    WOOD = 7,
}

impl BlockType {
    /// Every placeable material, in palette order.
    pub const PALETTE: [BlockType; 7] = [
        BlockType::SAND,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::SNOW,
        BlockType::LEAVES,
        BlockType::WOOD,
    ];

    /// Converts a raw voxel ID into a `BlockType`.
    ///
    /// # Arguments
    /// * `id` - The voxel ID as stored in a chunk
    ///
    /// # Returns
    /// `Some(BlockType)` for palette IDs and air, `None` for out-of-palette IDs.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The raw voxel ID of this material.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Returns `true` if the ID names a placeable palette material.
    pub fn is_placeable(id: BlockTypeSize) -> bool {
        matches!(Self::from_id(id), Some(block_type) if block_type != BlockType::AIR)
    }
}
