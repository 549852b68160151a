//! Vertex data structures and layouts for voxel rendering.
//!
//! One vertex format serves chunk meshes, the water plane and the voxel marker.

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Layer: u32 (4 bytes)
/// - Face Id: u32 (4 bytes)
/// - Shading: f32 (4 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the owning mesh's origin
    pub position: [f32; 3],
    /// Atlas texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Atlas row of the material, i.e. the voxel ID for palette materials
    pub layer: u32,
    /// `BlockSide` discriminant of the face this vertex belongs to
    pub face_id: u32,
    /// Face light factor multiplied by the ambient occlusion level
    pub shading: f32,
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `position` - Position relative to the mesh origin
    /// * `tex_coords` - Atlas texture coordinates
    /// * `layer` - Atlas row of the material
    /// * `face_id` - Face the vertex belongs to
    /// * `shading` - Combined face shading and ambient occlusion
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], layer: u32, face_id: u32, shading: f32) -> Self {
        Vertex {
            position,
            tex_coords,
            layer,
            face_id,
            shading,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Uint32,
        3 => Uint32,
        4 => Float32,
    ];

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: layer (u32)
    /// - `location = 3`: face_id (u32)
    /// - `location = 4`: shading (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::desc().array_stride, 32);
    }
}
