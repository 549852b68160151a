//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Player input processing for camera control
//! - The view frustum and the player's collision box
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Handles player input and updates camera state
//! - `Projection`: Manages the camera's projection matrix
//! - `Frustum`: Culls chunk bounding spheres against the view volume
//! - `PlayerBody`: The box the player occupies

use cgmath::{Deg, Matrix4, Point3};
use log::trace;

use crate::config::EngineConfig;

use super::PlayerAction;

pub mod camera;
mod frustum;
mod player_body;

pub use frustum::Frustum;
pub use player_body::PlayerBody;

use camera::{Camera, CameraController, Projection};

/// Owns the camera, its projection and the controller that moves it.
#[derive(Debug, Clone)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Perspective settings for the current viewport
    pub projection: Projection,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
    half_width: f32,
    eye_height: f32,
    head_clearance: f32,
}

impl CameraState {
    /// Creates the camera at the configured spawn position, looking along +X.
    ///
    /// # Arguments
    /// * `config` - Engine settings for speed, sensitivity, projection and body size
    /// * `width`, `height` - Initial viewport size in pixels
    pub fn new(config: &EngineConfig, width: u32, height: u32) -> Self {
        let [x, y, z] = config.spawn_position;
        let camera = Camera::new(Point3::new(x, y, z), Deg(0.0), Deg(0.0));
        let projection = Projection::new(
            width,
            height,
            Deg(config.fov_degrees),
            config.znear,
            config.zfar,
        );
        let camera_controller = CameraController::new(config.player_speed, config.mouse_sensitivity);

        Self {
            camera,
            projection,
            camera_controller,
            half_width: config.player_half_width,
            eye_height: config.player_eye_height,
            head_clearance: config.player_head_clearance,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Moves the camera by the pending controller input.
    ///
    /// # Returns
    /// `true` if the camera moved or turned
    pub fn update(&mut self, dt: web_time::Duration) -> bool {
        if !self.camera_controller.has_updates() {
            return false;
        }
        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);
        trace!(
            "Camera at {:?}, yaw {:?}, pitch {:?}",
            self.camera.position,
            self.camera.yaw,
            self.camera.pitch
        );
        true
    }

    /// Updates the projection for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// The current view frustum.
    pub fn frustum(&self) -> Frustum {
        Frustum::new(&self.camera, &self.projection)
    }

    /// The player's collision box at the current camera position.
    pub fn player_body(&self) -> PlayerBody {
        PlayerBody::around_eye(
            self.camera.position,
            self.half_width,
            self.eye_height,
            self.head_clearance,
        )
    }

    /// View matrix of the camera.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.calc_matrix()
    }

    /// Projection matrix of the camera.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.calc_matrix()
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;

    #[test]
    fn test_spawns_at_configured_position() {
        let config = EngineConfig {
            spawn_position: [1.0, 2.0, 3.0],
            ..Default::default()
        };
        let state = CameraState::new(&config, 800, 600);
        assert_eq!(state.camera.position, Point3::new(1.0, 2.0, 3.0));
        let body = state.player_body();
        assert!((body.max.y - (2.0 + config.player_head_clearance)).abs() < 1e-6);
    }

    #[test]
    fn test_update_without_input_is_idle() {
        let mut state = CameraState::new(&EngineConfig::default(), 800, 600);
        assert!(!state.update(Duration::from_millis(16)));
        state.intake_actions(&PlayerAction {
            move_left: true,
            ..Default::default()
        });
        assert!(state.update(Duration::from_millis(16)));
        assert!(!state.update(Duration::from_millis(16)));
    }
}
