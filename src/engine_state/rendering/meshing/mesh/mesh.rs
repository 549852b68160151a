//! Mesh data structures for voxel rendering.
//!
//! A `Mesh` is plain CPU-side geometry: vertices and `u32` indices ready to be
//! copied into GPU buffers by a graphics backend.

use crate::engine_state::rendering::Vertex;

/// Triangle order of a quad given as [ll, lr, ul, ur], split along ll-ur.
const QUAD_INDICES: [u32; 6] = [0, 1, 3, 0, 3, 2];
/// Triangle order of a quad split along the other diagonal, lr-ul.
const FLIPPED_QUAD_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

/// Vertex and index data of one drawable object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// The vertex data
    pub vertices: Vec<Vertex>,
    /// Indices into `vertices`
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quad given by its corners in [ll, lr, ul, ur] order.
    ///
    /// # Arguments
    /// * `corners` - The four corner vertices
    /// * `flip` - Split the quad along the lr-ul diagonal instead of ll-ur
    pub fn push_quad(&mut self, corners: [Vertex; 4], flip: bool) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        let order = if flip { FLIPPED_QUAD_INDICES } else { QUAD_INDICES };
        self.indices.extend(order.iter().map(|index| base + index));
    }

    /// Appends a line segment, for meshes drawn with a line-list topology.
    pub fn push_line(&mut self, start: Vertex, end: Vertex) {
        let base = self.vertices.len() as u32;
        self.vertices.push(start);
        self.vertices.push(end);
        self.indices.extend([base, base + 1]);
    }

    /// Number of quads, assuming the mesh was built from quads only.
    pub fn quad_count(&self) -> usize {
        self.indices.len() / QUAD_INDICES.len()
    }

    /// `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The vertices as raw bytes, in GPU layout.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The indices as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
