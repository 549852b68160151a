//! # Voxel Handler
//!
//! Picks the voxel under the crosshair and applies the player's edits.
//!
//! Picking walks the voxel grid along the view ray (3D DDA), visiting every
//! cell the ray passes through in order, so the first solid cell found is the
//! one the player sees. The face that was crossed to enter it gives the
//! normal along which new voxels are placed.

use cgmath::{Point3, Vector3};
use log::debug;

use crate::engine_state::{
    camera_state::{camera::Camera, PlayerBody},
    voxels::{
        block::{block_type::BlockType, is_solid, BlockTypeSize, AIR},
        chunk::ChunkPosition,
        world::World,
    },
};

/// The voxel currently under the crosshair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelTarget {
    /// World coordinate of the hit voxel
    pub voxel: Point3<i32>,
    /// ID of the hit voxel
    pub voxel_id: BlockTypeSize,
    /// Outward normal of the face the ray entered through
    pub normal: Vector3<i32>,
    /// Ray distance to the entry point
    pub distance: f32,
}

impl VoxelTarget {
    /// The cell a placement would fill: one step from the hit voxel along the normal.
    pub fn placement(&self) -> Point3<i32> {
        self.voxel + self.normal
    }
}

/// What applying an edit does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Clear the targeted voxel
    #[default]
    Remove,
    /// Fill the cell in front of the targeted face
    Place,
}

/// Walks the voxel grid from `origin` along `direction` and returns the first solid voxel.
///
/// # Arguments
/// * `origin` - Ray start in world space
/// * `direction` - Ray direction; need not be normalized, but must not be zero
/// * `reach` - Longest entry distance that still counts as a hit, in units of `direction`'s length
/// * `world` - Voxel source
pub fn raycast(origin: Point3<f32>, direction: Vector3<f32>, reach: f32, world: &World) -> Option<VoxelTarget> {
    let mut voxel = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );

    let mut step = Vector3::new(0, 0, 0);
    let mut t_delta = Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut t_max = Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    for axis in 0..3 {
        let d = direction[axis];
        if d == 0.0 {
            continue;
        }
        let cell = voxel[axis] as f32;
        step[axis] = if d > 0.0 { 1 } else { -1 };
        t_delta[axis] = 1.0 / d.abs();
        let boundary = if d > 0.0 { cell + 1.0 - origin[axis] } else { origin[axis] - cell };
        t_max[axis] = boundary * t_delta[axis];
    }

    let mut crossed: Option<usize> = None;
    let mut distance = 0.0;

    while distance <= reach {
        let voxel_id = world.get_voxel(voxel);
        if is_solid(voxel_id) {
            let normal = match crossed {
                Some(axis) => {
                    let mut normal = Vector3::new(0, 0, 0);
                    normal[axis] = -step[axis];
                    normal
                }
                None => inside_normal(direction),
            };
            return Some(VoxelTarget {
                voxel,
                voxel_id,
                normal,
                distance,
            });
        }

        let axis = if t_max.x < t_max.y {
            if t_max.x < t_max.z { 0 } else { 2 }
        } else if t_max.y < t_max.z {
            1
        } else {
            2
        };
        if !t_max[axis].is_finite() {
            return None;
        }
        distance = t_max[axis];
        voxel[axis] += step[axis];
        t_max[axis] += t_delta[axis];
        crossed = Some(axis);
    }

    None
}

/// Normal reported when the ray starts inside a solid voxel: against the dominant ray axis.
fn inside_normal(direction: Vector3<f32>) -> Vector3<i32> {
    let magnitudes = [direction.x.abs(), direction.y.abs(), direction.z.abs()];
    let mut axis = 0;
    for candidate in 1..3 {
        if magnitudes[candidate] > magnitudes[axis] {
            axis = candidate;
        }
    }
    let mut normal = Vector3::new(0, 0, 0);
    normal[axis] = if direction[axis] > 0.0 { -1 } else { 1 };
    normal
}

/// Tracks the crosshair target and performs edits through the world.
#[derive(Debug, Clone)]
pub struct VoxelHandler {
    target: Option<VoxelTarget>,
    mode: InteractionMode,
    material: BlockTypeSize,
    max_reach: f32,
}

impl VoxelHandler {
    /// Creates a handler in remove mode with dirt selected.
    pub fn new(max_reach: f32) -> Self {
        Self {
            target: None,
            mode: InteractionMode::default(),
            material: BlockType::DIRT.id(),
            max_reach,
        }
    }

    /// Casts the camera's view ray into the world.
    pub fn pick(&self, camera: &Camera, world: &World) -> Option<VoxelTarget> {
        raycast(camera.position, camera.forward(), self.max_reach, world)
    }

    /// Recomputes the target for this frame.
    pub fn update(&mut self, camera: &Camera, world: &World) {
        self.target = self.pick(camera, world);
    }

    /// The current target, `None` when nothing solid is within reach.
    pub fn target(&self) -> Option<&VoxelTarget> {
        self.target.as_ref()
    }

    /// The current interaction mode.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// The voxel ID placed in [`InteractionMode::Place`].
    pub fn material(&self) -> BlockTypeSize {
        self.material
    }

    /// Longest pick distance.
    pub fn max_reach(&self) -> f32 {
        self.max_reach
    }

    /// Switches between removing and placing.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            InteractionMode::Remove => InteractionMode::Place,
            InteractionMode::Place => InteractionMode::Remove,
        };
        debug!("Interaction mode set to {:?}", self.mode);
    }

    /// Selects the placement material.
    ///
    /// # Returns
    /// `false`, leaving the selection unchanged, if `id` is not a palette material
    pub fn select_material(&mut self, id: BlockTypeSize) -> bool {
        if !BlockType::is_placeable(id) {
            debug!("Ignoring selection of non-palette material {id}");
            return false;
        }
        self.material = id;
        true
    }

    /// Clears the targeted voxel.
    ///
    /// # Returns
    /// `true` if a voxel was removed
    pub fn remove_targeted(&mut self, world: &mut World) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        world.set_voxel(target.voxel, AIR);
        true
    }

    /// Fills the cell in front of the targeted face with `material`.
    ///
    /// The edit is refused when the cell is already solid or overlaps the
    /// player's body. A cell in a chunk that is not resident yet is generated
    /// first, so terrain it would receive counts as occupied.
    ///
    /// # Returns
    /// `true` if a voxel was placed
    pub fn place_targeted(&mut self, world: &mut World, material: BlockTypeSize, body: &PlayerBody) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let cell = target.placement();
        world.ensure_chunk(ChunkPosition::from_voxel(cell).0);
        if world.is_solid_at(cell) {
            debug!("Placement at {cell:?} rejected: cell is occupied");
            return false;
        }
        if body.intersects_voxel(cell) {
            debug!("Placement at {cell:?} rejected: cell overlaps the player");
            return false;
        }
        world.set_voxel(cell, material);
        true
    }

    /// Performs the edit of the current mode and refreshes the target.
    ///
    /// # Returns
    /// `true` if the world changed
    pub fn apply_action(&mut self, camera: &Camera, world: &mut World, body: &PlayerBody) -> bool {
        let changed = match self.mode {
            InteractionMode::Remove => self.remove_targeted(world),
            InteractionMode::Place => self.place_targeted(world, self.material, body),
        };
        if changed {
            self.update(camera, world);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;
    use crate::config::{EngineConfig, GenerationMethod};

    fn empty_world() -> World {
        World::new(&EngineConfig {
            generation_method: GenerationMethod::Empty,
            ..Default::default()
        })
    }

    fn far_body() -> PlayerBody {
        PlayerBody::around_eye(Point3::new(100.0, 100.0, 100.0), 0.3, 1.6, 0.2)
    }

    #[test]
    fn test_ray_hits_first_solid_voxel() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(3, 0, 0), 4);
        world.set_voxel(Point3::new(5, 0, 0), 4);
        let hit = raycast(Point3::new(0.5, 0.5, 0.5), Vector3::unit_x(), 6.0, &world);
        let hit = hit.expect("voxel in reach");
        assert_eq!(hit.voxel, Point3::new(3, 0, 0));
        assert_eq!(hit.normal, Vector3::new(-1, 0, 0));
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_ray_from_below_reports_bottom_face() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(0, 4, 0), 4);
        let hit = raycast(Point3::new(0.5, 0.5, 0.5), Vector3::unit_y(), 6.0, &world);
        assert_eq!(hit.map(|hit| hit.normal), Some(Vector3::new(0, -1, 0)));
    }

    #[test]
    fn test_ray_across_negative_coordinates() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(-3, 0, -1), 4);
        let hit = raycast(Point3::new(0.5, 0.5, -0.5), Vector3::new(-1.0, 0.0, 0.0), 6.0, &world);
        let hit = hit.expect("voxel in reach");
        assert_eq!(hit.voxel, Point3::new(-3, 0, -1));
        assert_eq!(hit.normal, Vector3::new(1, 0, 0));
    }

    #[test]
    fn test_ray_starting_inside_solid() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(0, 0, 0), 4);
        let hit = raycast(Point3::new(0.5, 0.5, 0.5), Vector3::new(0.2, -0.9, 0.1), 6.0, &world);
        let hit = hit.expect("start voxel is solid");
        assert_eq!(hit.voxel, Point3::new(0, 0, 0));
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_ray_on_cell_boundary_with_zero_component() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(4, 0, 0), 4);
        let hit = raycast(Point3::new(0.5, 0.0, 0.5), Vector3::unit_x(), 6.0, &world);
        assert_eq!(hit.map(|hit| hit.voxel), Some(Point3::new(4, 0, 0)));
    }

    #[test]
    fn test_place_and_remove_follow_mode() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(5, 0, 0), 4);
        let camera = Camera::new(Point3::new(0.5, 0.5, 0.5), Deg(0.0), Deg(0.0));
        let mut handler = VoxelHandler::new(6.0);
        handler.update(&camera, &world);

        handler.toggle_mode();
        assert!(handler.select_material(BlockType::WOOD.id()));
        assert!(handler.apply_action(&camera, &mut world, &far_body()));
        assert_eq!(world.get_voxel(Point3::new(4, 0, 0)), BlockType::WOOD.id());
        assert_eq!(handler.target().map(|target| target.voxel), Some(Point3::new(4, 0, 0)));

        handler.toggle_mode();
        assert!(handler.apply_action(&camera, &mut world, &far_body()));
        assert_eq!(world.get_voxel(Point3::new(4, 0, 0)), AIR);
        assert_eq!(handler.target().map(|target| target.voxel), Some(Point3::new(5, 0, 0)));
    }

    #[test]
    fn test_placement_inside_player_is_rejected() {
        let mut world = empty_world();
        world.set_voxel(Point3::new(0, 0, 0), 4);
        let camera = Camera::new(Point3::new(0.5, 2.5, 0.5), Deg(0.0), Deg(-89.0));
        let body = PlayerBody::around_eye(camera.position, 0.3, 1.6, 0.2);
        let mut handler = VoxelHandler::new(6.0);
        handler.update(&camera, &world);
        assert_eq!(handler.target().map(VoxelTarget::placement), Some(Point3::new(0, 1, 0)));

        assert!(!handler.place_targeted(&mut world, 4, &body));
        assert_eq!(world.get_voxel(Point3::new(0, 1, 0)), AIR);
    }

    #[test]
    fn test_placement_into_ungenerated_terrain_is_rejected() {
        let mut world = World::new(&EngineConfig {
            generation_method: GenerationMethod::Solid,
            ..Default::default()
        });
        world.ensure_chunk(ChunkPosition::new(0, 0, 0));
        let camera = Camera::new(Point3::new(-2.5, 5.5, 5.5), Deg(0.0), Deg(0.0));
        let mut handler = VoxelHandler::new(6.0);
        handler.update(&camera, &world);
        let target = handler.target().expect("chunk face in reach");
        assert_eq!(target.placement(), Point3::new(-1, 5, 5));
        assert!(!world.contains(ChunkPosition::new(-1, 0, 0)));

        assert!(!handler.place_targeted(&mut world, BlockType::WOOD.id(), &far_body()));
        assert!(world.contains(ChunkPosition::new(-1, 0, 0)));
        assert_eq!(world.get_voxel(Point3::new(-1, 5, 5)), BlockType::STONE.id());
    }

    #[test]
    fn test_no_target_means_no_edit() {
        let mut world = empty_world();
        let camera = Camera::new(Point3::new(0.5, 0.5, 0.5), Deg(0.0), Deg(0.0));
        let mut handler = VoxelHandler::new(6.0);
        handler.update(&camera, &world);
        assert!(handler.target().is_none());
        assert!(!handler.apply_action(&camera, &mut world, &far_body()));
        assert!(!handler.select_material(0));
        assert!(!handler.select_material(42));
        assert_eq!(handler.material(), BlockType::DIRT.id());
    }
}
