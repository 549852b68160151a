//! Mesh generation for voxel chunks.
//!
//! - [`Mesh`]: vertices and indices of one drawable object
//! - [`Face`]: one quad of a voxel, with its corner ambient occlusion
//! - [`build_mesh`]: face-culled meshing of a whole chunk

mod culled;
mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use culled::build_mesh;
pub use face::{Face, AO_LEVELS};
pub use mesh::*;
