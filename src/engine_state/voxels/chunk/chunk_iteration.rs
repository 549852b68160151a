//! # Chunk Iteration Module
//!
//! An iterator over the solid voxels of a chunk, in storage order, skipping air.

use cgmath::Point3;

use crate::engine_state::voxels::block::{is_solid, BlockTypeSize};

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// An iterator over all non-air voxels in a chunk.
///
/// Yields the local position and voxel ID of each solid voxel, walking the
/// storage once. Empty chunks end immediately without scanning.
pub struct ChunkVoxelIterator<'a> {
    /// The voxels being iterated over
    voxels: &'a [BlockTypeSize],
    /// Next storage index to inspect
    offset: usize,
    /// Solid voxels not yet yielded
    remaining: usize,
}

impl<'a> ChunkVoxelIterator<'a> {
    /// Creates a new `ChunkVoxelIterator` for the given chunk.
    pub fn new(chunk: &'a Chunk) -> Self {
        ChunkVoxelIterator {
            voxels: chunk.voxels(),
            offset: 0,
            remaining: chunk.solid_count(),
        }
    }
}

impl Iterator for ChunkVoxelIterator<'_> {
    type Item = (Point3<usize>, BlockTypeSize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        while self.offset < self.voxels.len() {
            let index = self.offset;
            self.offset += 1;

            let id = self.voxels[index];
            if is_solid(id) {
                self.remaining -= 1;
                let plane = CHUNK_PLANE_SIZE as usize;
                let row = CHUNK_DIMENSION as usize;
                let position = Point3::new(index % row, (index % plane) / row, index / plane);
                return Some((position, id));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkPosition;

    #[test]
    fn test_iterates_solids_in_storage_order() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        chunk.set(Point3::new(0, 0, 1), 3).unwrap();
        chunk.set(Point3::new(5, 1, 0), 2).unwrap();
        chunk.set(Point3::new(31, 0, 0), 1).unwrap();

        let visited: Vec<_> = chunk.iter_solid().collect();
        assert_eq!(
            visited,
            vec![
                (Point3::new(31, 0, 0), 1),
                (Point3::new(5, 1, 0), 2),
                (Point3::new(0, 0, 1), 3),
            ]
        );
    }

    #[test]
    fn test_empty_chunk_yields_nothing() {
        let chunk = Chunk::empty(ChunkPosition::default());
        assert_eq!(chunk.iter_solid().count(), 0);
    }
}
