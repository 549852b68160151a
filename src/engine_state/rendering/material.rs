//! # Materials
//!
//! Where on the texture atlas each voxel face samples from.
//!
//! The atlas is a grid with one row per material and three columns: top,
//! bottom and side. Row 0 holds the "missing" tile that every out-of-palette
//! ID falls back to, so a bad ID renders as an obvious checker instead of
//! failing.

use log::trace;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType, BlockTypeSize};

/// A rectangle of the atlas in normalized texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRect {
    /// Left edge
    pub u0: f32,
    /// Top edge
    pub v0: f32,
    /// Right edge
    pub u1: f32,
    /// Bottom edge
    pub v1: f32,
}

/// Supplies texture coordinates for voxel faces.
pub trait MaterialSource {
    /// The atlas rectangle for one face of a voxel ID.
    ///
    /// Out-of-palette IDs yield the missing tile.
    fn material_uv(&self, id: BlockTypeSize, side: BlockSide) -> AtlasRect;

    /// The atlas row used for a voxel ID, 0 for the missing tile.
    fn material_layer(&self, id: BlockTypeSize) -> u32;
}

/// Column of the atlas a face samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtlasColumn {
    /// Faces pointing up
    Top = 0,
    /// Faces pointing down
    Bottom = 1,
    /// The four horizontal faces
    Side = 2,
}

impl AtlasColumn {
    /// The column a face of the given side samples from.
    pub fn for_side(side: BlockSide) -> Self {
        match side {
            BlockSide::TOP => AtlasColumn::Top,
            BlockSide::BOTTOM => AtlasColumn::Bottom,
            _ => AtlasColumn::Side,
        }
    }
}

/// The grid layout of the material atlas.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    tile_size: u32,
}

impl TextureAtlas {
    /// Number of tile columns.
    pub const COLUMNS: u32 = 3;
    /// Number of tile rows: the missing row plus one per palette material.
    pub const ROWS: u32 = BlockType::PALETTE.len() as u32 + 1;

    /// Creates an atlas layout with square tiles of `tile_size` pixels.
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
        }
    }

    /// Edge length of one tile in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Width and height of the whole atlas in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.tile_size * Self::COLUMNS, self.tile_size * Self::ROWS)
    }

    /// The rectangle of the tile at (`row`, `column`).
    pub fn tile_rect(&self, row: u32, column: AtlasColumn) -> AtlasRect {
        let columns = Self::COLUMNS as f32;
        let rows = Self::ROWS as f32;
        let column = column as u32 as f32;
        let row = row as f32;
        AtlasRect {
            u0: column / columns,
            v0: row / rows,
            u1: (column + 1.0) / columns,
            v1: (row + 1.0) / rows,
        }
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new(16)
    }
}

impl MaterialSource for TextureAtlas {
    fn material_uv(&self, id: BlockTypeSize, side: BlockSide) -> AtlasRect {
        self.tile_rect(self.material_layer(id), AtlasColumn::for_side(side))
    }

    fn material_layer(&self, id: BlockTypeSize) -> u32 {
        if BlockType::is_placeable(id) {
            u32::from(id)
        } else {
            trace!("Voxel id {id} has no material, using the missing tile");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_rows() {
        let atlas = TextureAtlas::default();
        assert_eq!(atlas.material_layer(BlockType::GRASS.id()), 2);
        assert_eq!(atlas.material_layer(BlockType::WOOD.id()), 7);
        assert_eq!(TextureAtlas::ROWS, 8);
    }

    #[test]
    fn test_unknown_id_uses_missing_tile() {
        let atlas = TextureAtlas::default();
        assert_eq!(atlas.material_layer(200), 0);
        assert_eq!(
            atlas.material_uv(200, BlockSide::TOP),
            atlas.tile_rect(0, AtlasColumn::Top)
        );
    }

    #[test]
    fn test_columns_by_side() {
        let atlas = TextureAtlas::default();
        let top = atlas.material_uv(2, BlockSide::TOP);
        let side = atlas.material_uv(2, BlockSide::LEFT);
        let bottom = atlas.material_uv(2, BlockSide::BOTTOM);
        assert_eq!(top.v0, side.v0);
        assert!(top.u0 < bottom.u0 && bottom.u0 < side.u0);
        assert!((side.u1 - 1.0).abs() < f32::EPSILON);
    }
}
