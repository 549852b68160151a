//! # Application State Management
//!
//! This module drives the explorer from winit, including:
//! - Window and graphics initialization
//! - Input handling
//! - The per-frame update and render loop

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{grab_cursor, GraphicsBuilder, GraphicsEvent, MaybeGraphics};
use input_manager::InputManager;
use log::{error, info};
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    config::EngineConfig,
    engine_state::{
        rendering::{material::TextureAtlas, WgpuBackend},
        EngineState,
    },
    error::BackendError,
};

/// Longest frame step fed to the engine; longer stalls are simulated as this.
const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

/// The main application state container that manages the application's lifecycle.
pub struct ApplicationState {
    /// Where graphics initialization stands
    graphics: MaybeGraphics,
    /// Settings for the engine, taken when it starts
    config: Option<EngineConfig>,
    /// The initialized application state, if the application has started
    state: Option<InitializedApplicationState>,
    /// The error that stopped the event loop, if any
    error: Option<BackendError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The explorer itself
    pub engine_state: EngineState,

    /// The window renderer
    pub backend: WgpuBackend,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: Instant,
}

impl ApplicationState {
    /// Creates the application; graphics are built on the first resume.
    pub fn new(config: EngineConfig, event_loop_proxy: EventLoopProxy<GraphicsEvent>) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            config: Some(config),
            state: None,
            error: None,
        }
    }

    /// The error that ended the event loop, if it did not end normally.
    pub fn take_error(&mut self) -> Option<BackendError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: BackendError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler<GraphicsEvent> for ApplicationState {
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            if let WindowEvent::CloseRequested = event {
                event_loop.exit();
            }
            return;
        };

        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.backend.resize(size.width, size.height);
                state.engine_state.resize(size.width, size.height);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                ..
            } => grab_cursor(&state.window),
            WindowEvent::RedrawRequested => {
                state.engine_state.render(&mut state.backend);
                if let Err(err) = state.backend.present() {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(state), DeviceEvent::MouseMotion { delta }) = (&mut self.state, event) {
            state.input_manager.intake_mouse_motion(delta);
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: GraphicsEvent) {
        self.graphics = MaybeGraphics::Moved;
        let gfx = match graphics {
            Ok(gfx) => gfx,
            Err(err) => return self.fail(event_loop, err),
        };
        let Some(config) = self.config.take() else {
            return;
        };

        let size = gfx.window.inner_size();
        let backend = WgpuBackend::new(
            gfx.surface,
            gfx.surface_config,
            gfx.device,
            gfx.queue,
            &TextureAtlas::default(),
        );
        let engine_state = EngineState::new(config, size.width.max(1), size.height.max(1));
        info!("Graphics ready at {}x{}", size.width, size.height);

        self.state = Some(InitializedApplicationState {
            engine_state,
            backend,
            window: gfx.window,
            input_manager: InputManager::new(),
            last_wait_time: Instant::now(),
        });
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        let now = Instant::now();
        let dt = (now - state.last_wait_time).min(MAX_FRAME_TIME);
        state.last_wait_time = now;

        let processed_input = state.input_manager.get_and_reset_processed_input();
        state.engine_state.set_input_commands(processed_input);
        state.engine_state.update(dt);

        if state.engine_state.exit_requested() {
            event_loop.exit();
            return;
        }
        state.window.request_redraw();
    }
}
