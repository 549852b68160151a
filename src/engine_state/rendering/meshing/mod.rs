//! Mesh generation and management for voxel rendering.
//!
//! This module turns chunk voxels into GPU-friendly triangle meshes and keeps
//! the backend's copies of those meshes current.
//!
//! # Architecture
//! - `mesh/`: the [`Mesh`] type and the face-culled chunk mesher
//! - [`NeighborBoundaries`]: the voxel layers of adjacent chunks a mesh build reads
//! - [`ChunkMeshRenderer`]: uploads rebuilt meshes and draws visible chunks

mod boundaries;
mod mesh;
mod renderer;

pub use boundaries::NeighborBoundaries;
pub use mesh::*;
pub use renderer::ChunkMeshRenderer;
