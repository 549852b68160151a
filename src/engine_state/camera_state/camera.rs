//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and transformations
//! - Projection matrix handling
//! - Camera controller for input processing
//!
//! ## Key Components
//! - `Camera`: The camera's position and orientation in 3D space
//! - `Projection`: Perspective projection settings
//! - `CameraController`: Turns player actions into camera motion

use cgmath::*;
use std::f32::consts::FRAC_PI_2;
use web_time::Duration;

use crate::engine_state::PlayerAction;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU's normalized device coordinates range from 0 to 1 in Z rather than
/// -1 to 1. The matrix scales Z by one half and then shifts it by one half.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
///
/// Yaw 0 looks along +X; positive yaw turns toward +Z. Positive pitch looks up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation in radians, kept inside (-π/2, π/2)
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space
    /// * `yaw` - Initial yaw (horizontal rotation around Y axis)
    /// * `pitch` - Initial pitch, clamped to just short of straight up or down
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Unit vector in the viewing direction.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    /// Unit vector to the camera's right, always horizontal.
    pub fn right(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        Vector3::new(-yaw_sin, 0.0, yaw_cos)
    }

    /// Unit vector to the top of the screen.
    pub fn up(&self) -> Vector3<f32> {
        self.right().cross(self.forward()).normalize()
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 matrix transforming world coordinates to view space
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    /// Applies and clears the controller's pending movement and rotation.
    ///
    /// Movement is scaled by `dt`; rotation comes from mouse deltas that
    /// already represent the whole frame and is applied as is.
    pub fn get_controller_updates_and_reset_controller(
        &mut self,
        controller: &mut CameraController,
        dt: Duration,
    ) {
        let dt = dt.as_secs_f32();

        // Horizontal movement ignores pitch
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = self.right();
        let step = controller.speed * dt;
        self.position += forward * (controller.amount_forward - controller.amount_backward) * step;
        self.position += right * (controller.amount_right - controller.amount_left) * step;
        self.position.y += (controller.amount_up - controller.amount_down) * step;

        self.yaw += Rad(controller.rotate_horizontal);
        self.pitch += Rad(-controller.rotate_vertical);
        self.clamp_pitch();

        controller.reset();
    }

    fn clamp_pitch(&mut self) {
        self.pitch = Rad(self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Vertical field of view.
    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    /// Horizontal field of view derived from the vertical one and the aspect ratio.
    pub fn fovx(&self) -> Rad<f32> {
        Rad(2.0 * ((self.fovy.0 * 0.5).tan() * self.aspect).atan())
    }

    /// Near clipping plane distance.
    pub fn znear(&self) -> f32 {
        self.znear
    }

    /// Far clipping plane distance.
    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    /// Calculates the projection matrix in WGPU clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Handles camera movement and rotation based on user input.
///
/// Actions are collected with [`intake_actions`](Self::intake_actions) and
/// consumed by [`Camera::get_controller_updates_and_reset_controller`].
#[derive(Debug, Clone)]
pub struct CameraController {
    // Movement directions, 0 or 1
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,

    // Rotation amounts (in radians)
    rotate_horizontal: f32,
    rotate_vertical: f32,

    // Configuration
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// Creates a new camera controller with the given speed and sensitivity.
    ///
    /// # Arguments
    /// * `speed` - Movement speed in units per second
    /// * `sensitivity` - Radians of rotation per unit of mouse motion
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Processes player actions and updates controller state accordingly.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        let amount = |pressed: bool| if pressed { 1.0 } else { 0.0 };
        self.amount_forward = amount(actions.move_forward);
        self.amount_backward = amount(actions.move_backward);
        self.amount_left = amount(actions.move_left);
        self.amount_right = amount(actions.move_right);
        self.amount_up = amount(actions.move_up);
        self.amount_down = amount(actions.move_down);
        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32 * self.sensitivity;
            self.rotate_vertical += delta_y as f32 * self.sensitivity;
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.amount_up > 0.0
            || self.amount_down > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    fn reset(&mut self) {
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.amount_up = 0.0;
        self.amount_down = 0.0;
        self.amount_left = 0.0;
        self.amount_right = 0.0;
        self.amount_forward = 0.0;
        self.amount_backward = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_at_zero_yaw_is_positive_x() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        assert!((camera.forward() - Vector3::unit_x()).magnitude() < 1e-6);
        assert!((camera.right() - Vector3::unit_z()).magnitude() < 1e-6);
        assert!((camera.up() - Vector3::unit_y()).magnitude() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(1.0, 1.0);
        controller.intake_actions(&PlayerAction {
            rotate_view: Some((0.0, -10.0)),
            ..Default::default()
        });
        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::from_millis(16));
        assert!(camera.pitch.0 < FRAC_PI_2);
        assert!(!controller.has_updates());
    }

    #[test]
    fn test_movement_scales_with_time() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(10.0, 0.002);
        controller.intake_actions(&PlayerAction {
            move_forward: true,
            move_up: true,
            ..Default::default()
        });
        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::from_millis(500));
        assert!((camera.position.x - 5.0).abs() < 1e-4);
        assert!((camera.position.y - 5.0).abs() < 1e-4);
        assert!(camera.position.z.abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_fov_widens_with_aspect() {
        let projection = Projection::new(1600, 900, Deg(50.0), 0.1, 100.0);
        assert!(projection.fovx().0 > projection.fovy().0);
        let square = Projection::new(100, 100, Deg(50.0), 0.1, 100.0);
        assert!((square.fovx().0 - square.fovy().0).abs() < 1e-5);
    }
}
