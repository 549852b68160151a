//! Voxel layers borrowed from the six face-adjacent chunks.

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, BlockTypeSize, AIR},
    chunk::CHUNK_DIMENSION,
};

/// The layer of voxels just outside each face of a chunk.
///
/// Each layer comes from the neighbour on that side and uses the indexing of
/// [`Chunk::boundary_layer`](crate::engine_state::voxels::chunk::Chunk::boundary_layer).
/// A missing layer means the neighbour is not loaded and reads as air.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborBoundaries {
    layers: [Option<Box<[BlockTypeSize]>>; 6],
}

impl NeighborBoundaries {
    /// Boundaries with every neighbour missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the layer of the neighbour on `side`.
    pub fn set(&mut self, side: BlockSide, layer: Box<[BlockTypeSize]>) {
        debug_assert_eq!(layer.len(), (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize);
        self.layers[side as usize] = Some(layer);
    }

    /// The raw layer of the neighbour on `side`, if it is loaded.
    pub fn layer(&self, side: BlockSide) -> Option<&[BlockTypeSize]> {
        self.layers[side as usize].as_deref()
    }

    /// Reads one voxel of the layer on `side` at in-plane coordinates (`a`, `b`).
    ///
    /// Missing neighbours and coordinates outside the layer read as air.
    pub fn get(&self, side: BlockSide, a: i32, b: i32) -> BlockTypeSize {
        let range = 0..CHUNK_DIMENSION;
        if !range.contains(&a) || !range.contains(&b) {
            return AIR;
        }
        self.layer(side)
            .map(|layer| layer[(a + CHUNK_DIMENSION * b) as usize])
            .unwrap_or(AIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_layer_reads_air() {
        let boundaries = NeighborBoundaries::new();
        assert_eq!(boundaries.get(BlockSide::TOP, 3, 3), AIR);
        assert!(boundaries.layer(BlockSide::TOP).is_none());
    }

    #[test]
    fn test_set_layer_is_indexed_a_then_b() {
        let n = CHUNK_DIMENSION as usize;
        let mut layer = vec![AIR; n * n];
        layer[2 + n * 5] = 7;
        let mut boundaries = NeighborBoundaries::new();
        boundaries.set(BlockSide::LEFT, layer.into_boxed_slice());
        assert_eq!(boundaries.get(BlockSide::LEFT, 2, 5), 7);
        assert_eq!(boundaries.get(BlockSide::LEFT, 5, 2), AIR);
        assert_eq!(boundaries.get(BlockSide::LEFT, -1, 2), AIR);
    }
}
