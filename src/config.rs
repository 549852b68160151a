//! # Engine Configuration
//!
//! Every tunable of the explorer lives in [`EngineConfig`]. It is read once at
//! startup from the JSON file named by the `VOXEL_EXPLORER_CONFIG` environment
//! variable; missing fields, or a missing variable, fall back to the defaults
//! below.
//!
//! ```json
//! {
//!     "seed": 7,
//!     "render_distance": 6,
//!     "rebuild_policy": { "budget": 8 },
//!     "terrain": { "island_radius": null }
//! }
//! ```

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_EXPLORER_CONFIG";

/// How many dirty chunk meshes the world rebuilds per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Rebuild every dirty chunk each frame.
    All,
    /// Rebuild at most this many dirty chunks each frame.
    Budget(usize),
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        RebuildPolicy::Budget(16)
    }
}

/// The terrain function used for new chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GenerationMethod {
    /// Noise-driven islands with caves, material layers and trees.
    Noise,
    /// Grass plain whose top surface is at `height - 1`, stone below.
    Flat {
        /// First air layer above the plain.
        height: i32,
    },
    /// Every voxel is stone.
    Solid,
    /// Every voxel is air.
    Empty,
    /// Alternating stone and air in all three axes.
    Checkerboard,
}

impl Default for GenerationMethod {
    fn default() -> Self {
        GenerationMethod::Noise
    }
}

/// Parameters of the noise terrain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Amplitude of the lowest octave, in voxels.
    pub base_amplitude: f64,
    /// Frequency of the lowest octave; each further octave doubles it.
    pub base_frequency: f64,
    /// Number of height octaves.
    pub octaves: u32,
    /// Radius of the island falloff around the world origin, `None` for endless land.
    pub island_radius: Option<f64>,
    /// Frequency of the 3D cave noise.
    pub cave_frequency: f64,
    /// Surface level (before jitter) at and above which columns are capped with snow.
    pub snow_level: i32,
    /// Surface level at and above which bare stone shows.
    pub stone_level: i32,
    /// Surface level at and above which dirt shows.
    pub dirt_level: i32,
    /// Surface level at and above which grass grows; sand below.
    pub grass_level: i32,
    /// Chance for a grass column to sprout a tree.
    pub tree_probability: f64,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            base_amplitude: 48.0,
            base_frequency: 0.005,
            octaves: 4,
            island_radius: Some(400.0),
            cave_frequency: 0.09,
            snow_level: 54,
            stone_level: 49,
            dirt_level: 40,
            grass_level: 8,
            tree_probability: 0.02,
        }
    }
}

/// Every tunable of the explorer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed of every noise field and deterministic hash.
    pub seed: u32,
    /// Terrain function for new chunks.
    pub generation_method: GenerationMethod,
    /// Horizontal load and draw radius, in chunks.
    pub render_distance: u32,
    /// Lowest chunk layer that is streamed in.
    pub min_chunk_y: i32,
    /// Highest chunk layer that is streamed in.
    pub max_chunk_y: i32,
    /// Most chunks generated per frame.
    pub generation_budget: usize,
    /// Mesh rebuild policy.
    pub rebuild_policy: RebuildPolicy,
    /// Resident chunk count above which unedited far chunks are evicted.
    pub max_resident_chunks: usize,
    /// Fly speed in voxels per second.
    pub player_speed: f32,
    /// Mouse look sensitivity in radians per pixel.
    pub mouse_sensitivity: f32,
    /// Vertical field of view.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub znear: f32,
    /// Far clip distance.
    pub zfar: f32,
    /// Longest distance at which voxels can be picked.
    pub max_reach: f32,
    /// Half extent of the player body on X and Z.
    pub player_half_width: f32,
    /// Distance from the feet to the eye.
    pub player_eye_height: f32,
    /// Body extent above the eye.
    pub player_head_clearance: f32,
    /// Height of the water plane.
    pub water_level: f32,
    /// Side length of the water plane.
    pub water_extent: f32,
    /// Noise terrain parameters.
    pub terrain: TerrainSettings,
    /// Initial eye position.
    pub spawn_position: [f32; 3],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            generation_method: GenerationMethod::default(),
            render_distance: 5,
            min_chunk_y: 0,
            max_chunk_y: 3,
            generation_budget: 2,
            rebuild_policy: RebuildPolicy::default(),
            max_resident_chunks: 768,
            player_speed: 20.0,
            mouse_sensitivity: 0.002,
            fov_degrees: 50.0,
            znear: 0.1,
            zfar: 2000.0,
            max_reach: 6.0,
            player_half_width: 0.3,
            player_eye_height: 1.6,
            player_head_clearance: 0.2,
            water_level: 5.6,
            water_extent: 3200.0,
            terrain: TerrainSettings::default(),
            spawn_position: [0.0, 80.0, 0.0],
        }
    }
}

impl EngineConfig {
    /// Reads and validates a config from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Path of the JSON file
    ///
    /// # Returns
    /// The parsed config, or a `ConfigError` describing what went wrong.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `VOXEL_EXPLORER_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                info!("Loading config from {}", Path::new(&path).display());
                Self::load(path)
            }
            None => {
                info!("{CONFIG_ENV_VAR} not set, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.min_chunk_y > self.max_chunk_y {
            return Err(invalid(
                "min_chunk_y",
                format!("{} is above max_chunk_y {}", self.min_chunk_y, self.max_chunk_y),
            ));
        }
        if self.generation_budget == 0 {
            return Err(invalid("generation_budget", "must be at least 1"));
        }
        if self.rebuild_policy == RebuildPolicy::Budget(0) {
            return Err(invalid("rebuild_policy", "budget must be at least 1"));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees", "must lie strictly between 0 and 180"));
        }
        if !(self.znear > 0.0 && self.zfar > self.znear) {
            return Err(invalid("zfar", "clip planes must satisfy 0 < znear < zfar"));
        }
        if self.max_reach <= 0.0 {
            return Err(invalid("max_reach", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "seed": 9, "terrain": { "octaves": 2 } }"#).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.terrain.octaves, 2);
        assert_eq!(config.terrain.snow_level, 54);
        assert_eq!(config.render_distance, EngineConfig::default().render_distance);
    }

    #[test]
    fn test_policy_and_method_formats() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "rebuild_policy": { "budget": 3 },
                "generation_method": { "kind": "flat", "height": 4 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.rebuild_policy, RebuildPolicy::Budget(3));
        assert_eq!(config.generation_method, GenerationMethod::Flat { height: 4 });

        let config: EngineConfig = serde_json::from_str(r#"{ "rebuild_policy": "all" }"#).unwrap();
        assert_eq!(config.rebuild_policy, RebuildPolicy::All);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = EngineConfig {
            min_chunk_y: 4,
            max_chunk_y: 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "min_chunk_y", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
