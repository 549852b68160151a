//! # Voxel World
//!
//! This module contains everything that represents and edits the voxel world.
//!
//! ## Architecture
//!
//! * **Block**: voxel IDs, the material palette and the six faces of a cube
//! * **Chunk**: fixed-size 3D arrays of voxel IDs with their mesh state
//! * **Terrain**: deterministic procedural generation of chunks
//! * **World**: the resident chunks, voxel access by world coordinate, streaming and rebuilds
//! * **Voxel Handler**: crosshair picking and player edits
//!
//! ## Data Flow
//!
//! 1. The world streams in chunks from the terrain generator around the player
//! 2. Edits go through the world, which marks affected chunks dirty
//! 3. Dirty chunks are remeshed under the rebuild policy
//! 4. The renderer uploads meshes whose revision changed

pub mod block;
pub mod chunk;
pub mod terrain;
pub mod voxel_handler;
pub mod world;
