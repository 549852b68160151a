//! Wireframe highlight around the voxel an edit would affect.

use cgmath::{Matrix4, Point3, Vector3};

use super::{
    backend::{DrawPass, GraphicsBackend, MeshHandle},
    meshing::Mesh,
    vertex::Vertex,
};
use crate::engine_state::voxels::voxel_handler::{InteractionMode, VoxelHandler};

/// Inset of the cube edges so they are not hidden by the voxel faces.
const MARGIN: f32 = 0.01;

/// Marker colour index for remove mode, read by the marker shader.
pub const REMOVE_LAYER: u32 = 0;
/// Marker colour index for place mode.
pub const PLACE_LAYER: u32 = 1;

/// Builds the twelve edges of a unit cube, slightly enlarged.
pub fn cube_outline(layer: u32) -> Mesh {
    let lo = -MARGIN;
    let hi = 1.0 + MARGIN;
    let corner = |x: bool, y: bool, z: bool| {
        let pick = |high: bool| if high { hi } else { lo };
        Vertex::new([pick(x), pick(y), pick(z)], [0.0, 0.0], layer, 0, 1.0)
    };

    let mut mesh = Mesh::new();
    for a in [false, true] {
        for b in [false, true] {
            mesh.push_line(corner(false, a, b), corner(true, a, b));
            mesh.push_line(corner(a, false, b), corner(a, true, b));
            mesh.push_line(corner(a, b, false), corner(a, b, true));
        }
    }
    mesh
}

/// Draws the highlight cube for the handler's current target.
#[derive(Debug, Default)]
pub struct VoxelMarker {
    remove_handle: Option<MeshHandle>,
    place_handle: Option<MeshHandle>,
}

impl VoxelMarker {
    /// Creates a marker; meshes are uploaded on first draw.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell the marker should outline, `None` without a target.
    pub fn marked_voxel(handler: &VoxelHandler) -> Option<Point3<i32>> {
        let target = handler.target()?;
        Some(match handler.mode() {
            InteractionMode::Remove => target.voxel,
            InteractionMode::Place => target.placement(),
        })
    }

    /// Queues the marker draw for this frame.
    pub fn draw(&mut self, handler: &VoxelHandler, backend: &mut dyn GraphicsBackend) {
        let Some(voxel) = Self::marked_voxel(handler) else {
            return;
        };
        let (slot, layer) = match handler.mode() {
            InteractionMode::Remove => (&mut self.remove_handle, REMOVE_LAYER),
            InteractionMode::Place => (&mut self.place_handle, PLACE_LAYER),
        };
        let handle = *slot.get_or_insert_with(|| backend.upload_mesh(&cube_outline(layer)));
        let offset = Vector3::new(voxel.x as f32, voxel.y as f32, voxel.z as f32);
        backend.draw(handle, Matrix4::from_translation(offset), DrawPass::Marker);
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Transform};

    use super::*;
    use crate::{
        config::{EngineConfig, GenerationMethod},
        engine_state::{
            camera_state::camera::Camera,
            rendering::backend::HeadlessBackend,
            voxels::{block::block_type::BlockType, world::World},
        },
    };

    fn setup() -> (World, Camera) {
        let mut world = World::new(&EngineConfig {
            generation_method: GenerationMethod::Empty,
            ..Default::default()
        });
        world.set_voxel(Point3::new(3, 0, 0), BlockType::STONE.id());
        let camera = Camera::new(Point3::new(0.5, 0.5, 0.5), Deg(0.0), Deg(0.0));
        (world, camera)
    }

    #[test]
    fn test_outline_has_twelve_edges() {
        let mesh = cube_outline(REMOVE_LAYER);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 24);
    }

    #[test]
    fn test_no_target_draws_nothing() {
        let handler = VoxelHandler::new(6.0);
        let mut marker = VoxelMarker::new();
        let mut backend = HeadlessBackend::new();
        marker.draw(&handler, &mut backend);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_marks_target_or_placement_by_mode() {
        let (world, camera) = setup();
        let mut handler = VoxelHandler::new(6.0);
        handler.update(&camera, &world);
        let mut marker = VoxelMarker::new();
        let mut backend = HeadlessBackend::new();

        marker.draw(&handler, &mut backend);
        handler.toggle_mode();
        marker.draw(&handler, &mut backend);

        let draws = backend.draws();
        assert_eq!(draws.len(), 2);
        let origin = |m: Matrix4<f32>| m.transform_point(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(origin(draws[0].1), Point3::new(3.0, 0.0, 0.0));
        assert_eq!(origin(draws[1].1), Point3::new(2.0, 0.0, 0.0));
        assert_ne!(draws[0].0, draws[1].0);
        assert!(draws.iter().all(|(_, _, pass)| *pass == DrawPass::Marker));
    }
}
