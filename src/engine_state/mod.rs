//! # Engine State Module
//!
//! The state of a running explorer, independent of any window or GPU.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the camera and the scene and steps them frame by frame
//! * `camera_state` - Camera positioning, movement, frustum and player body
//! * `rendering` - Meshing, the scene and the graphics backends
//! * `voxels` - Voxel data, chunks, terrain generation and editing
//!
//! ## Frame Order
//!
//! 1. Input is translated into a [`PlayerAction`]
//! 2. [`EngineState::update`] moves the camera, advances the scene and applies edits
//! 3. [`EngineState::render`] queues the frame on a [`GraphicsBackend`]

use log::{debug, info};
use web_time::Duration;
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    application_state::input_state::ProcessedInputState,
    config::EngineConfig,
};

use camera_state::CameraState;
use rendering::{scene::SceneUpdate, GraphicsBackend, Scene};
use voxels::block::BlockTypeSize;

pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// Keys selecting the placement material, in palette order.
const MATERIAL_KEYS: [KeyCode; 7] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
];

/// Represents player actions derived from input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAction {
    /// Fly along the horizontal view direction
    pub move_forward: bool,
    /// Fly against the horizontal view direction
    pub move_backward: bool,
    /// Strafe left
    pub move_left: bool,
    /// Strafe right
    pub move_right: bool,
    /// Rise
    pub move_up: bool,
    /// Sink
    pub move_down: bool,

    /// Mouse motion to turn the view by, in device units
    pub rotate_view: Option<(f64, f64)>,

    /// Apply the current edit mode to the target
    pub apply_edit: bool,
    /// Switch between removing and placing
    pub toggle_mode: bool,
    /// Select a placement material by voxel ID
    pub select_material: Option<BlockTypeSize>,
    /// Leave the application
    pub exit: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    ///
    /// Movement follows held keys; edits, mode toggles and material
    /// selection only fire on the frame the key or button goes down.
    pub fn from_input(input: &ProcessedInputState) -> Self {
        let key_active = |key| input.get_key_state(key).is_active();
        let key_pressed = |key| input.get_key_state(key).is_just_pressed();

        let select_material = MATERIAL_KEYS
            .iter()
            .zip(1..)
            .find(|(key, _)| key_pressed(**key))
            .map(|(_, id)| id);

        PlayerAction {
            move_forward: key_active(KeyCode::KeyW),
            move_backward: key_active(KeyCode::KeyS),
            move_left: key_active(KeyCode::KeyA),
            move_right: key_active(KeyCode::KeyD),
            move_up: key_active(KeyCode::Space) || key_active(KeyCode::KeyQ),
            move_down: key_active(KeyCode::ShiftLeft) || key_active(KeyCode::KeyE),
            rotate_view: input.get_mouse_delta(),
            apply_edit: input.get_mouse_button_state(MouseButton::Left).is_just_pressed(),
            toggle_mode: input.get_mouse_button_state(MouseButton::Right).is_just_pressed(),
            select_material,
            exit: key_pressed(KeyCode::Escape),
        }
    }
}

/// The main state container for the explorer.
pub struct EngineState {
    config: EngineConfig,
    /// The camera, its projection and controller
    pub camera_state: CameraState,
    scene: Scene,
    player_actions: PlayerAction,
    elapsed: Duration,
    exit_requested: bool,
}

impl EngineState {
    /// Creates the engine for a viewport of `width` x `height` pixels.
    pub fn new(config: EngineConfig, width: u32, height: u32) -> Self {
        info!(
            "Starting explorer with seed {} and {:?} terrain",
            config.seed, config.generation_method
        );
        let camera_state = CameraState::new(&config, width, height);
        let scene = Scene::new(&config);

        Self {
            config,
            camera_state,
            scene,
            player_actions: PlayerAction::default(),
            elapsed: Duration::ZERO,
            exit_requested: false,
        }
    }

    /// The settings the engine was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The world and everything drawn with it.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, for direct world edits.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Time simulated so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `true` once the player asked to quit.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Updates the projection for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera_state.resize(width, height);
    }

    /// Translates this frame's input and stores the resulting actions.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.set_player_actions(PlayerAction::from_input(&input));
    }

    /// Stores the actions the next [`update`](Self::update) applies.
    pub fn set_player_actions(&mut self, actions: PlayerAction) {
        self.player_actions = actions;
    }

    /// Advances the engine by `dt`.
    ///
    /// Moves the camera, streams and remeshes the world, re-picks the target
    /// and finally applies the frame's edit against that fresh target.
    pub fn update(&mut self, dt: Duration) -> SceneUpdate {
        let actions = std::mem::take(&mut self.player_actions);
        self.elapsed += dt;

        if actions.exit {
            info!("Exit requested");
            self.exit_requested = true;
        }

        self.camera_state.intake_actions(&actions);
        self.camera_state.update(dt);

        let handler = self.scene.voxel_handler_mut();
        if actions.toggle_mode {
            handler.toggle_mode();
        }
        if let Some(id) = actions.select_material {
            if handler.select_material(id) {
                debug!("Selected material {id}");
            }
        }

        let frustum = self.camera_state.frustum();
        let update = self.scene.update(&self.camera_state.camera, &frustum);

        if actions.apply_edit {
            let body = self.camera_state.player_body();
            self.scene.apply_action(&self.camera_state.camera, &body);
        }

        update
    }

    /// Queues the current frame on `backend`.
    pub fn render(&mut self, backend: &mut dyn GraphicsBackend) {
        self.scene
            .render(backend, &self.camera_state, self.elapsed.as_secs_f32());
    }
}
