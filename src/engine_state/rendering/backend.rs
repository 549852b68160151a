//! # Graphics Backend
//!
//! The seam between the engine and whatever puts pixels on screen.
//!
//! The engine only ever talks to a [`GraphicsBackend`]: it uploads meshes,
//! receives opaque handles, and issues draws with a model transform and a
//! [`DrawPass`]. [`WgpuBackend`](super::WgpuBackend) renders to a window;
//! [`HeadlessBackend`] records every call so that frame logic can be checked
//! without a GPU.

use std::collections::HashMap;

use cgmath::Matrix4;
use log::trace;

use super::meshing::Mesh;

/// Opaque reference to a mesh uploaded to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// The pipeline a draw goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    /// Opaque, textured chunk geometry
    Terrain,
    /// Alpha-blended animated water
    Water,
    /// Wireframe highlight lines
    Marker,
}

/// Operations the engine needs from a renderer.
pub trait GraphicsBackend {
    /// Copies a mesh to the backend and returns a handle to it.
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle;

    /// Frees an uploaded mesh. Unknown handles are ignored.
    fn release_mesh(&mut self, handle: MeshHandle);

    /// Queues one draw of an uploaded mesh for the current frame.
    ///
    /// # Arguments
    /// * `handle` - The mesh to draw
    /// * `transform` - Model matrix placing the mesh in the world
    /// * `pass` - Which pipeline to draw it with
    fn draw(&mut self, handle: MeshHandle, transform: Matrix4<f32>, pass: DrawPass);

    /// Sets the view and projection matrices used by following draws.
    fn set_camera(&mut self, view: Matrix4<f32>, projection: Matrix4<f32>);

    /// Sets the animation clock, in seconds since start.
    fn set_time(&mut self, seconds: f32);
}

/// A call received by a [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A mesh was uploaded
    Upload {
        /// Handle given out for the mesh
        handle: MeshHandle,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },
    /// A mesh was released
    Release(MeshHandle),
    /// A draw was queued
    Draw {
        /// Mesh drawn
        handle: MeshHandle,
        /// Model matrix
        transform: Matrix4<f32>,
        /// Pipeline used
        pass: DrawPass,
    },
    /// The camera changed
    SetCamera {
        /// View matrix
        view: Matrix4<f32>,
        /// Projection matrix
        projection: Matrix4<f32>,
    },
    /// The clock changed
    SetTime(f32),
}

/// A backend without a GPU that records what it is asked to do.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    meshes: HashMap<MeshHandle, Mesh>,
    calls: Vec<BackendCall>,
}

impl HeadlessBackend {
    /// Creates a backend with no meshes and no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received since creation or the last [`clear_calls`](Self::clear_calls).
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// The recorded draws, in call order.
    pub fn draws(&self) -> Vec<(MeshHandle, Matrix4<f32>, DrawPass)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Draw {
                    handle,
                    transform,
                    pass,
                } => Some((*handle, *transform, *pass)),
                _ => None,
            })
            .collect()
    }

    /// The mesh stored under `handle`, if it is still live.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(&handle)
    }

    /// Number of uploaded meshes not yet released.
    pub fn live_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Forgets the recorded calls, keeping the live meshes.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.meshes.insert(handle, mesh.clone());
        self.calls.push(BackendCall::Upload {
            handle,
            vertex_count: mesh.vertices.len(),
        });
        handle
    }

    fn release_mesh(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_none() {
            trace!("Release of unknown mesh {handle:?}");
        }
        self.calls.push(BackendCall::Release(handle));
    }

    fn draw(&mut self, handle: MeshHandle, transform: Matrix4<f32>, pass: DrawPass) {
        self.calls.push(BackendCall::Draw {
            handle,
            transform,
            pass,
        });
    }

    fn set_camera(&mut self, view: Matrix4<f32>, projection: Matrix4<f32>) {
        self.calls.push(BackendCall::SetCamera { view, projection });
    }

    fn set_time(&mut self, seconds: f32) {
        self.calls.push(BackendCall::SetTime(seconds));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::SquareMatrix;

    use super::*;

    #[test]
    fn test_handles_are_unique_and_released() {
        let mut backend = HeadlessBackend::new();
        let first = backend.upload_mesh(&Mesh::new());
        let second = backend.upload_mesh(&Mesh::new());
        assert_ne!(first, second);
        assert_eq!(backend.live_mesh_count(), 2);

        backend.release_mesh(first);
        assert_eq!(backend.live_mesh_count(), 1);
        assert!(backend.mesh(first).is_none());
        assert!(backend.mesh(second).is_some());
    }

    #[test]
    fn test_draws_are_recorded_in_order() {
        let mut backend = HeadlessBackend::new();
        let handle = backend.upload_mesh(&Mesh::new());
        backend.draw(handle, Matrix4::identity(), DrawPass::Terrain);
        backend.draw(handle, Matrix4::identity(), DrawPass::Marker);
        let passes: Vec<_> = backend.draws().into_iter().map(|(_, _, pass)| pass).collect();
        assert_eq!(passes, vec![DrawPass::Terrain, DrawPass::Marker]);

        backend.clear_calls();
        assert!(backend.calls().is_empty());
        assert_eq!(backend.live_mesh_count(), 1);
    }
}
