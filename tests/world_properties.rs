//! End-to-end checks of world generation, meshing, editing and picking
//! through the public API.

use cgmath::{Deg, Point3, Vector3};
use voxel_explorer::{
    config::{EngineConfig, GenerationMethod},
    engine_state::{
        camera_state::{camera::Camera, PlayerBody},
        rendering::{
            material::TextureAtlas,
            meshing::{build_mesh, NeighborBoundaries},
        },
        voxels::{
            block::{block_side::BlockSide, block_type::BlockType, AIR},
            chunk::{Chunk, ChunkPosition, CHUNK_PLANE_SIZE},
            terrain::TerrainGenerator,
            voxel_handler::{raycast, VoxelHandler},
            world::World,
        },
    },
};

fn empty_world() -> World {
    World::new(&EngineConfig {
        generation_method: GenerationMethod::Empty,
        ..Default::default()
    })
}

fn far_away_body() -> PlayerBody {
    PlayerBody::around_eye(Point3::new(100.0, 100.0, 100.0), 0.3, 1.6, 0.2)
}

#[test]
fn test_generation_is_deterministic() {
    let config = EngineConfig {
        seed: 42,
        ..Default::default()
    };
    let first = TerrainGenerator::from_config(&config);
    let second = TerrainGenerator::from_config(&config);

    for position in [ChunkPosition::new(0, 0, 0), ChunkPosition::new(3, 1, -2)] {
        assert_eq!(
            first.fill_chunk(position).voxels(),
            second.fill_chunk(position).voxels()
        );
    }
    for voxel in [Point3::new(0, 10, 0), Point3::new(-57, 33, 912)] {
        assert_eq!(first.generate(voxel), second.generate(voxel));
    }
}

#[test]
fn test_rebuilding_unchanged_chunk_is_identical() {
    let generator = TerrainGenerator::from_config(&EngineConfig::default());
    let chunk = generator.fill_chunk(ChunkPosition::new(0, 0, 0));
    let atlas = TextureAtlas::default();
    let boundaries = NeighborBoundaries::new();

    let first = build_mesh(&chunk, &boundaries, &atlas);
    let second = build_mesh(&chunk, &boundaries, &atlas);
    assert_eq!(first.vertex_bytes(), second.vertex_bytes());
    assert_eq!(first.indices, second.indices);
}

#[test]
fn test_face_culling() {
    let atlas = TextureAtlas::default();
    let stone = BlockType::STONE.id();

    let mut enclosed = NeighborBoundaries::new();
    for side in BlockSide::all() {
        enclosed.set(side, vec![stone; CHUNK_PLANE_SIZE as usize].into_boxed_slice());
    }
    let solid = Chunk::filled(ChunkPosition::default(), stone);
    assert_eq!(build_mesh(&solid, &enclosed, &atlas).quad_count(), 0);

    let mut single = Chunk::empty(ChunkPosition::default());
    single.set(Point3::new(7, 7, 7), stone).unwrap();
    assert_eq!(build_mesh(&single, &NeighborBoundaries::new(), &atlas).quad_count(), 6);
}

#[test]
fn test_edit_round_trip() {
    let mut world = empty_world();
    let voxel = Point3::new(-40, 70, 13);

    world.set_voxel(voxel, BlockType::SNOW.id());
    assert_eq!(world.get_voxel(voxel), BlockType::SNOW.id());

    world.set_voxel(voxel, AIR);
    assert_eq!(world.get_voxel(voxel), AIR);
}

#[test]
fn test_dirty_propagation() {
    let mut world = empty_world();
    let atlas = TextureAtlas::default();
    let own = ChunkPosition::new(0, 0, 0);
    let neighbor = ChunkPosition::new(1, 0, 0);
    world.ensure_chunk(own);
    world.ensure_chunk(neighbor);
    world.update(&atlas);
    assert!(world.dirty_chunks().is_empty());

    world.set_voxel(Point3::new(5, 5, 5), BlockType::DIRT.id());
    assert_eq!(world.dirty_chunks(), vec![own]);
    world.update(&atlas);

    world.set_voxel(Point3::new(31, 5, 5), BlockType::DIRT.id());
    assert_eq!(world.dirty_chunks(), vec![own, neighbor]);
}

#[test]
fn test_ray_pick_respects_reach() {
    let mut world = empty_world();
    world.set_voxel(Point3::new(5, 0, 0), BlockType::STONE.id());
    let origin = Point3::new(0.5, 0.5, 0.5);
    let direction = Vector3::new(1.0, 0.0, 0.0);

    let hit = raycast(origin, direction, 6.0, &world).expect("voxel within reach");
    assert_eq!(hit.voxel, Point3::new(5, 0, 0));
    assert_eq!(hit.normal, Vector3::new(-1, 0, 0));
    assert!((hit.distance - 4.5).abs() < 1e-4);

    assert!(raycast(origin, direction, 4.0, &world).is_none());
}

#[test]
fn test_placement_adjacency() {
    let mut world = empty_world();
    world.set_voxel(Point3::new(5, 0, 0), BlockType::STONE.id());
    let camera = Camera::new(Point3::new(0.5, 0.5, 0.5), Deg(0.0), Deg(0.0));
    let mut handler = VoxelHandler::new(6.0);

    handler.update(&camera, &world);
    assert!(handler.place_targeted(&mut world, BlockType::WOOD.id(), &far_away_body()));
    assert_eq!(world.get_voxel(Point3::new(4, 0, 0)), BlockType::WOOD.id());

    // The cell in front of the new target gets filled behind the handler's back.
    handler.update(&camera, &world);
    world.set_voxel(Point3::new(3, 0, 0), BlockType::STONE.id());
    assert!(!handler.place_targeted(&mut world, BlockType::WOOD.id(), &far_away_body()));
    assert_eq!(world.get_voxel(Point3::new(3, 0, 0)), BlockType::STONE.id());
}

#[test]
fn test_placement_inside_player_is_rejected() {
    let mut world = empty_world();
    world.set_voxel(Point3::new(5, 0, 0), BlockType::STONE.id());
    let camera = Camera::new(Point3::new(0.5, 0.5, 0.5), Deg(0.0), Deg(0.0));
    let mut handler = VoxelHandler::new(6.0);
    handler.update(&camera, &world);

    let body = PlayerBody::around_eye(Point3::new(4.5, 1.6, 0.5), 0.3, 1.6, 0.2);
    assert!(!handler.place_targeted(&mut world, BlockType::WOOD.id(), &body));
    assert_eq!(world.get_voxel(Point3::new(4, 0, 0)), AIR);
}
