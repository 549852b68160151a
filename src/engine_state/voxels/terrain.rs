//! # Terrain Generation
//!
//! Deterministic terrain: a pure function from world voxel coordinates to voxel
//! IDs, plus per-chunk tree decoration.
//!
//! ## Noise Terrain
//!
//! Column heights come from octaves of 2D OpenSimplex noise, scaled down by an
//! island falloff around the world origin. Below the surface voxel the column
//! is stone with caves carved out by 3D noise; the surface voxel picks its
//! material from its height, jittered by a per-voxel hash so layer borders
//! look ragged. Trees are planted per chunk, only where the whole tree fits
//! inside the chunk, so chunks never depend on their neighbours and the
//! generation order does not matter.

use cgmath::Point3;
use noise::{NoiseFn, OpenSimplex};

use crate::config::{EngineConfig, GenerationMethod, TerrainSettings};

use super::{
    block::{block_type::BlockType, BlockTypeSize, AIR},
    chunk::{Chunk, ChunkPosition, CHUNK_DIMENSION, CHUNK_SIZE},
};

/// Width of a tree crown.
pub const TREE_WIDTH: i32 = 4;
/// Half of the crown width.
pub const TREE_HALF_WIDTH: i32 = TREE_WIDTH / 2;
/// Height of a tree from the dirt under the trunk to the top leaf.
pub const TREE_HEIGHT: i32 = TREE_WIDTH * 2;
/// Height at which the crown starts.
pub const TREE_HALF_HEIGHT: i32 = TREE_HEIGHT / 2;

/// Maximum jitter subtracted from a surface voxel's height before picking its layer.
const SURFACE_JITTER: u32 = 6;
/// Frequency of the mask that damps the first octave.
const AMPLITUDE_MASK_FREQUENCY: f64 = 0.1;
/// Damping applied to the first octave where the mask is negative.
const AMPLITUDE_DAMPING: f64 = 1.07;
/// Frequency of the noise that raises cave floors.
const CAVE_FLOOR_FREQUENCY: f64 = 0.1;
/// Caves stay at least this far below the surface.
const CAVE_ROOF_DEPTH: i32 = 10;

const JITTER_SALT: u64 = 0x6a09_e667_f3bc_c908;
const TREE_SALT: u64 = 0xbb67_ae85_84ca_a73b;

/// Builds a generator seeded from `seed`, the voxel coordinate and a salt.
fn voxel_rng(seed: u32, x: i32, y: i32, z: i32, salt: u64) -> fastrand::Rng {
    let mut hash = u64::from(seed) ^ salt;
    for component in [x, y, z] {
        hash ^= u64::from(component as u32);
        hash = hash.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        hash ^= hash >> 31;
    }
    fastrand::Rng::with_seed(hash)
}

/// Procedural terrain source.
///
/// `generate` and `fill_chunk` are pure given the seed, the method and the
/// terrain settings.
pub struct TerrainGenerator {
    seed: u32,
    method: GenerationMethod,
    settings: TerrainSettings,
    noise: OpenSimplex,
}

impl TerrainGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `seed` - Seed of the noise fields and per-voxel hashes
    /// * `method` - Which terrain function to use
    /// * `settings` - Parameters of the noise terrain
    pub fn new(seed: u32, method: GenerationMethod, settings: TerrainSettings) -> Self {
        Self {
            seed,
            method,
            settings,
            noise: OpenSimplex::new(seed),
        }
    }

    /// Creates a generator from the terrain fields of the engine config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.seed, config.generation_method, config.terrain.clone())
    }

    fn noise2(&self, x: f64, z: f64) -> f64 {
        self.noise.get([x, z])
    }

    fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise.get([x, y, z])
    }

    /// Height of the noise terrain column at (x, z): the first air voxel above it.
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        let settings = &self.settings;
        let (xf, zf) = (f64::from(x), f64::from(z));

        let island = match settings.island_radius {
            Some(radius) if radius > 0.0 => {
                let falloff = (xf.hypot(zf) / radius).powi(20) + 0.0001;
                (1.0 / falloff).min(1.0)
            }
            _ => 1.0,
        };

        let mut height = 0.0;
        let mut frequency = settings.base_frequency;
        for octave in 0..settings.octaves.max(1) {
            let mut amplitude = settings.base_amplitude / f64::from(1u32 << octave.min(31));
            if octave == 0
                && self.noise2(xf * AMPLITUDE_MASK_FREQUENCY, zf * AMPLITUDE_MASK_FREQUENCY) < 0.0
            {
                amplitude /= AMPLITUDE_DAMPING;
            }
            let offset = if octave % 2 == 0 { amplitude } else { -amplitude };
            height += self.noise2(xf * frequency, zf * frequency) * amplitude + offset;
            frequency *= 2.0;
        }

        let finest = frequency * 0.5;
        height = height.max(self.noise2(xf * finest, zf * finest) + 2.0);
        (height * island) as i32
    }

    /// The voxel ID at a world coordinate, before tree decoration.
    pub fn generate(&self, voxel: Point3<i32>) -> BlockTypeSize {
        match self.method {
            GenerationMethod::Noise => {
                let height = self.column_height(voxel.x, voxel.z);
                self.noise_voxel(voxel, height)
            }
            GenerationMethod::Flat { height } => {
                if voxel.y < height - 1 {
                    BlockType::STONE.id()
                } else if voxel.y == height - 1 {
                    BlockType::GRASS.id()
                } else {
                    AIR
                }
            }
            GenerationMethod::Solid => BlockType::STONE.id(),
            GenerationMethod::Empty => AIR,
            GenerationMethod::Checkerboard => {
                if (voxel.x + voxel.y + voxel.z).rem_euclid(2) == 0 {
                    BlockType::STONE.id()
                } else {
                    AIR
                }
            }
        }
    }

    fn noise_voxel(&self, voxel: Point3<i32>, height: i32) -> BlockTypeSize {
        let Point3 { x, y, z } = voxel;
        if y >= height {
            return AIR;
        }

        let settings = &self.settings;
        if y < height - 1 {
            let below_roof = y < height - CAVE_ROOF_DEPTH;
            if below_roof {
                let floor = self.noise2(
                    f64::from(x) * CAVE_FLOOR_FREQUENCY,
                    f64::from(z) * CAVE_FLOOR_FREQUENCY,
                ) * 3.0
                    + 3.0;
                let frequency = settings.cave_frequency;
                if f64::from(y) > floor
                    && self.noise3(
                        f64::from(x) * frequency,
                        f64::from(y) * frequency,
                        f64::from(z) * frequency,
                    ) > 0.0
                {
                    return AIR;
                }
            }
            return BlockType::STONE.id();
        }

        let jitter = voxel_rng(self.seed, x, y, z, JITTER_SALT).u32(0..=SURFACE_JITTER) as i32;
        let level = y - jitter;
        let block_type = if level >= settings.snow_level {
            BlockType::SNOW
        } else if level >= settings.stone_level {
            BlockType::STONE
        } else if level >= settings.dirt_level {
            BlockType::DIRT
        } else if level >= settings.grass_level {
            BlockType::GRASS
        } else {
            BlockType::SAND
        };
        block_type.id()
    }

    /// Generates every voxel of a chunk, including trees.
    ///
    /// Noise column heights are evaluated once per column.
    pub fn fill_chunk(&self, position: ChunkPosition) -> Chunk {
        let n = CHUNK_DIMENSION;
        let origin = position.origin();
        let mut voxels = vec![AIR; CHUNK_SIZE as usize];

        match self.method {
            GenerationMethod::Noise => {
                let mut surfaces = Vec::new();
                for z in 0..n {
                    for x in 0..n {
                        let (wx, wz) = (origin.x + x, origin.z + z);
                        let height = self.column_height(wx, wz);
                        let top = (height - origin.y).min(n);
                        for y in 0..top {
                            let id = self.noise_voxel(Point3::new(wx, origin.y + y, wz), height);
                            voxels[Chunk::index(x as usize, y as usize, z as usize)] = id;
                        }
                        if (0..n).contains(&(height - 1 - origin.y)) {
                            surfaces.push(Point3::new(x, height - 1 - origin.y, z));
                        }
                    }
                }
                self.plant_trees(origin, &surfaces, &mut voxels);
            }
            _ => {
                for z in 0..n {
                    for y in 0..n {
                        for x in 0..n {
                            let id = self.generate(Point3::new(origin.x + x, origin.y + y, origin.z + z));
                            voxels[Chunk::index(x as usize, y as usize, z as usize)] = id;
                        }
                    }
                }
            }
        }

        Chunk::from_voxels(position, voxels)
    }

    fn plant_trees(&self, origin: Point3<i32>, surfaces: &[Point3<i32>], voxels: &mut [BlockTypeSize]) {
        for surface in surfaces {
            let index = Chunk::index(surface.x as usize, surface.y as usize, surface.z as usize);
            if voxels[index] != BlockType::GRASS.id()
                || origin.y + surface.y >= self.settings.dirt_level
            {
                continue;
            }

            let mut rng = voxel_rng(self.seed, origin.x + surface.x, 0, origin.z + surface.z, TREE_SALT);
            if rng.f64() >= self.settings.tree_probability {
                continue;
            }
            place_tree(voxels, *surface, &mut rng);
        }
    }
}

/// Plants a tree whose trunk stands on the local voxel `base`.
///
/// Does nothing unless the whole tree fits inside the chunk.
pub fn place_tree(voxels: &mut [BlockTypeSize], base: Point3<i32>, rng: &mut fastrand::Rng) {
    let n = CHUNK_DIMENSION;
    let Point3 { x, y, z } = base;
    if y < 0 || y + TREE_HEIGHT >= n {
        return;
    }
    if x - TREE_HALF_WIDTH < 0 || x + TREE_HALF_WIDTH >= n {
        return;
    }
    if z - TREE_HALF_WIDTH < 0 || z + TREE_HALF_WIDTH >= n {
        return;
    }

    let mut put = |x: i32, y: i32, z: i32, block_type: BlockType| {
        voxels[Chunk::index(x as usize, y as usize, z as usize)] = block_type.id();
    };

    put(x, y, z, BlockType::DIRT);

    let mut shrink = 0;
    for (layer, iy) in (TREE_HALF_HEIGHT..TREE_HEIGHT - 1).enumerate() {
        let shift = iy % 2;
        let skew = rng.i32(0..2);
        for ix in (-TREE_HALF_WIDTH + shrink)..(TREE_HALF_WIDTH - shrink * skew) {
            for iz in (-TREE_HALF_WIDTH + shrink * skew)..(TREE_HALF_WIDTH - shrink) {
                if (ix + iz).rem_euclid(4) != 0 {
                    put(x + ix + shift, y + iy, z + iz + shift, BlockType::LEAVES);
                }
            }
        }
        if layer > 0 {
            shrink += 1;
        }
    }

    for iy in 1..TREE_HEIGHT - 2 {
        put(x, y + iy, z, BlockType::WOOD);
    }
    put(x, y + TREE_HEIGHT - 2, z, BlockType::LEAVES);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_without_trees() -> TerrainSettings {
        TerrainSettings {
            tree_probability: 0.0,
            ..TerrainSettings::default()
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = TerrainGenerator::new(42, GenerationMethod::Noise, TerrainSettings::default());
        let b = TerrainGenerator::new(42, GenerationMethod::Noise, TerrainSettings::default());
        for x in -40..40 {
            for y in [0, 10, 30, 45, 60] {
                let voxel = Point3::new(x * 7, y, x * 3);
                assert_eq!(a.generate(voxel), b.generate(voxel));
            }
        }
    }

    #[test]
    fn test_fill_chunk_is_deterministic() {
        let a = TerrainGenerator::new(3, GenerationMethod::Noise, TerrainSettings::default());
        let b = TerrainGenerator::new(3, GenerationMethod::Noise, TerrainSettings::default());
        let position = ChunkPosition::new(1, 1, -2);
        assert_eq!(a.fill_chunk(position).voxels(), b.fill_chunk(position).voxels());
    }

    #[test]
    fn test_fill_chunk_matches_generate_without_trees() {
        let generator = TerrainGenerator::new(11, GenerationMethod::Noise, settings_without_trees());
        let position = ChunkPosition::new(0, 1, 0);
        let chunk = generator.fill_chunk(position);
        for (x, y, z) in [(0, 0, 0), (5, 3, 17), (31, 31, 31), (16, 12, 2), (9, 20, 30)] {
            let local = Point3::new(x, y, z);
            assert_eq!(
                chunk.get(local).unwrap(),
                generator.generate(position.to_world(local)),
                "mismatch at {local:?}"
            );
        }
    }

    #[test]
    fn test_island_falloff_sinks_far_columns() {
        let generator = TerrainGenerator::new(0, GenerationMethod::Noise, TerrainSettings::default());
        assert_eq!(generator.column_height(100_000, 0), 0);
        assert_eq!(generator.generate(Point3::new(100_000, 0, 0)), AIR);
    }

    #[test]
    fn test_flat_terrain() {
        let generator = TerrainGenerator::new(0, GenerationMethod::Flat { height: 4 }, TerrainSettings::default());
        let chunk = generator.fill_chunk(ChunkPosition::new(0, 0, 0));
        assert_eq!(chunk.get(Point3::new(3, 2, 3)).unwrap(), BlockType::STONE.id());
        assert_eq!(chunk.get(Point3::new(3, 3, 3)).unwrap(), BlockType::GRASS.id());
        assert_eq!(chunk.get(Point3::new(3, 4, 3)).unwrap(), AIR);
        assert_eq!(chunk.solid_count(), 4 * 32 * 32);
    }

    #[test]
    fn test_place_tree_shape() {
        let mut voxels = vec![AIR; CHUNK_SIZE as usize];
        let mut rng = fastrand::Rng::with_seed(1);
        place_tree(&mut voxels, Point3::new(10, 5, 10), &mut rng);

        let at = |x: usize, y: usize, z: usize| voxels[Chunk::index(x, y, z)];
        assert_eq!(at(10, 5, 10), BlockType::DIRT.id());
        for y in 6..11 {
            assert_eq!(at(10, y, 10), BlockType::WOOD.id());
        }
        assert_eq!(at(10, 11, 10), BlockType::LEAVES.id());
        assert!(voxels.iter().filter(|id| **id == BlockType::LEAVES.id()).count() > 1);
    }

    #[test]
    fn test_place_tree_refuses_chunk_edges() {
        let mut voxels = vec![AIR; CHUNK_SIZE as usize];
        let mut rng = fastrand::Rng::with_seed(1);
        place_tree(&mut voxels, Point3::new(1, 5, 10), &mut rng);
        place_tree(&mut voxels, Point3::new(10, 25, 10), &mut rng);
        assert!(voxels.iter().all(|id| *id == AIR));
    }
}
