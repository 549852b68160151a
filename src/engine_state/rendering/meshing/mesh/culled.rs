//! Face-culled chunk meshing with per-vertex ambient occlusion.
//!
//! Every solid voxel emits one quad per face whose neighbouring voxel is air.
//! Neighbour lookups go through a padded occupancy grid, one voxel wider than
//! the chunk on each side, filled from the chunk itself and the six boundary
//! layers. Edge and corner cells of the padding have no source and stay open.

use bitvec::prelude::*;
use cgmath::Point3;

use crate::engine_state::{
    rendering::{
        material::MaterialSource,
        meshing::{
            boundaries::NeighborBoundaries,
            mesh::{face::AO_LEVELS, Face, Mesh},
        },
        Vertex,
    },
    voxels::{
        block::{block_side::BlockSide, is_solid},
        chunk::{Chunk, CHUNK_DIMENSION, CHUNK_DIMENSION_WRAPPED, CHUNK_PLANE_SIZE_WRAPPED, CHUNK_SIZE_WRAPPED},
    },
};

/// Solid/air flags for a chunk plus a one voxel border.
struct PaddedOccupancy {
    bits: BitVec,
}

impl PaddedOccupancy {
    fn new(chunk: &Chunk, boundaries: &NeighborBoundaries) -> Self {
        let mut bits = bitvec![0; CHUNK_SIZE_WRAPPED];

        for (local, _) in chunk.iter_solid() {
            let index = Self::index(local.x as i32, local.y as i32, local.z as i32);
            bits.set(index, true);
        }

        let last = CHUNK_DIMENSION;
        for side in BlockSide::all() {
            let fixed = if side.is_positive() { last } else { -1 };
            for b in 0..CHUNK_DIMENSION {
                for a in 0..CHUNK_DIMENSION {
                    if !is_solid(boundaries.get(side, a, b)) {
                        continue;
                    }
                    let index = match side.axis() {
                        0 => Self::index(fixed, a, b),
                        1 => Self::index(a, fixed, b),
                        _ => Self::index(a, b, fixed),
                    };
                    bits.set(index, true);
                }
            }
        }

        Self { bits }
    }

    /// Padded storage index of a chunk coordinate in `-1..=CHUNK_DIMENSION`.
    fn index(x: i32, y: i32, z: i32) -> usize {
        (x + 1) as usize + CHUNK_DIMENSION_WRAPPED * (y + 1) as usize + CHUNK_PLANE_SIZE_WRAPPED * (z + 1) as usize
    }

    fn is_solid(&self, p: Point3<i32>) -> bool {
        let range = -1..=CHUNK_DIMENSION;
        if !range.contains(&p.x) || !range.contains(&p.y) || !range.contains(&p.z) {
            return false;
        }
        self.bits[Self::index(p.x, p.y, p.z)]
    }
}

/// Builds the render mesh of a chunk.
///
/// Output is a pure function of the inputs: voxels are visited in storage
/// order and faces in [`BlockSide::all`] order.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `boundaries` - Voxel layers of the face-adjacent chunks
/// * `materials` - Atlas lookup for texture coordinates
///
/// # Returns
/// Vertices in chunk-local space, one quad per exposed face.
pub fn build_mesh(chunk: &Chunk, boundaries: &NeighborBoundaries, materials: &dyn MaterialSource) -> Mesh {
    let mut mesh = Mesh::new();
    if chunk.is_empty() {
        return mesh;
    }

    let occupancy = PaddedOccupancy::new(chunk, boundaries);

    for (local, id) in chunk.iter_solid() {
        let voxel = Point3::new(local.x as i32, local.y as i32, local.z as i32);
        let layer = materials.material_layer(id);

        for side in BlockSide::all() {
            if occupancy.is_solid(voxel + side.normal()) {
                continue;
            }

            let face = Face::new(voxel.x, voxel.y, voxel.z, id, side);
            let ao = face.ambient_occlusion(voxel, |p| occupancy.is_solid(p));
            let uv = materials.material_uv(id, side);
            let tex_coords = [[uv.u0, uv.v1], [uv.u1, uv.v1], [uv.u0, uv.v0], [uv.u1, uv.v0]];

            let corners = face.corners();
            let vertices: [Vertex; 4] = std::array::from_fn(|i| {
                let corner = corners[i];
                Vertex::new(
                    [corner.x as f32, corner.y as f32, corner.z as f32],
                    tex_coords[i],
                    layer,
                    side as u32,
                    side.shading() * AO_LEVELS[ao[i] as usize],
                )
            });

            mesh.push_quad(vertices, Face::should_flip(ao));
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::material::TextureAtlas,
        voxels::{
            block::block_type::BlockType,
            chunk::ChunkPosition,
        },
    };

    fn full_layer(id: u8) -> Box<[u8]> {
        vec![id; (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize].into_boxed_slice()
    }

    #[test]
    fn test_isolated_voxel_has_six_quads() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        chunk.set(Point3::new(10, 10, 10), BlockType::STONE.id()).unwrap();
        let mesh = build_mesh(&chunk, &NeighborBoundaries::new(), &TextureAtlas::default());
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        // No occluders, so every vertex gets the plain face shading.
        for vertex in &mesh.vertices {
            let side = BlockSide::all()[vertex.face_id as usize];
            assert_eq!(vertex.shading, side.shading());
        }
    }

    #[test]
    fn test_enclosed_chunk_has_no_quads() {
        let chunk = Chunk::filled(ChunkPosition::default(), BlockType::STONE.id());
        let mut boundaries = NeighborBoundaries::new();
        for side in BlockSide::all() {
            boundaries.set(side, full_layer(BlockType::STONE.id()));
        }
        let mesh = build_mesh(&chunk, &boundaries, &TextureAtlas::default());
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_missing_neighbours_expose_borders() {
        let chunk = Chunk::filled(ChunkPosition::default(), BlockType::STONE.id());
        let mesh = build_mesh(&chunk, &NeighborBoundaries::new(), &TextureAtlas::default());
        let per_side = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
        assert_eq!(mesh.quad_count(), 6 * per_side);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        for x in 0..5 {
            chunk.set(Point3::new(x, 0, x), BlockType::GRASS.id()).unwrap();
            chunk.set(Point3::new(x, 1, 0), BlockType::SAND.id()).unwrap();
        }
        let atlas = TextureAtlas::default();
        let boundaries = NeighborBoundaries::new();
        let first = build_mesh(&chunk, &boundaries, &atlas);
        let second = build_mesh(&chunk, &boundaries, &atlas);
        assert_eq!(first.vertex_bytes(), second.vertex_bytes());
        assert_eq!(first.indices, second.indices);
    }

    #[test]
    fn test_unknown_id_uses_missing_layer() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        chunk.set(Point3::new(1, 1, 1), 250).unwrap();
        let mesh = build_mesh(&chunk, &NeighborBoundaries::new(), &TextureAtlas::default());
        assert_eq!(mesh.quad_count(), 6);
        assert!(mesh.vertices.iter().all(|vertex| vertex.layer == 0));
    }

    #[test]
    fn test_neighbour_voxel_darkens_corner() {
        let mut chunk = Chunk::empty(ChunkPosition::default());
        chunk.set(Point3::new(5, 5, 5), BlockType::DIRT.id()).unwrap();
        chunk.set(Point3::new(4, 6, 5), BlockType::DIRT.id()).unwrap();
        let mesh = build_mesh(&chunk, &NeighborBoundaries::new(), &TextureAtlas::default());
        let top = BlockSide::TOP as u32;
        let darkened = mesh
            .vertices
            .iter()
            .filter(|vertex| vertex.face_id == top && vertex.shading < BlockSide::TOP.shading())
            .count();
        // The lower voxel's top face has its two -x corners occluded.
        assert_eq!(darkened, 2);
    }
}
