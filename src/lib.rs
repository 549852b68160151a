#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Explorer
//!
//! An interactive, first-person voxel world: procedurally generated islands
//! streamed in 32³ chunks around the player, meshed with face culling and
//! ambient occlusion, rendered with WGPU, and editable block by block.
//!
//! ## Key Modules
//!
//! * `config` - Every tunable, loaded from JSON
//! * `engine_state` - The world, the camera, meshing and the graphics backends
//! * `error` - Error types for voxel access, configuration and the GPU backend
//!
//! ## Architecture
//!
//! The engine is single-threaded and frame-stepped: input, then update, then
//! render. Everything up to the [`GraphicsBackend`] seam runs without a GPU,
//! so the whole frame can be driven from tests with a [`HeadlessBackend`].
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_explorer::run()
//! }
//! ```

use anyhow::Context;
use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
pub mod config;
pub mod engine_state;
pub mod error;

pub use application_state::input_state::{ProcessedInputState, RawInputState};
pub use config::EngineConfig;
pub use engine_state::{
    rendering::{GraphicsBackend, HeadlessBackend},
    EngineState, PlayerAction,
};

/// Opens the window and runs the explorer until it is closed.
///
/// Logging goes to stdout, filtered by `RUST_LOG`. The configuration is read
/// from the file named by `VOXEL_EXPLORER_CONFIG`, if set.
///
/// # Errors
/// Fails when the configuration is invalid, the event loop cannot start, or
/// the graphics backend cannot be brought up or loses its surface memory.
pub fn run() -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::from_env().context("failed to load configuration")?;

    let event_loop = EventLoop::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let mut state = ApplicationState::new(config, event_loop.create_proxy());
    event_loop.run_app(&mut state).context("event loop failed")?;

    if let Some(err) = state.take_error() {
        return Err(err).context("graphics backend failed");
    }
    info!("Explorer closed");
    Ok(())
}
