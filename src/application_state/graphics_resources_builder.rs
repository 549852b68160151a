//! # Graphics Resources Builder
//!
//! Creates the window and the WebGPU context it renders with.
//!
//! The main components are:
//! - `Graphics`: The window, surface, device and queue
//! - `GraphicsBuilder`: Builds `Graphics` once and posts it back through the event loop
//! - `MaybeGraphics`: Where in that process the application is

use std::sync::Arc;

use log::{error, info, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::{CursorGrabMode, Window},
};

use crate::error::BackendError;

/// Title of the explorer window.
const WINDOW_TITLE: &str = "Voxel Explorer";

/// Contains all graphics-related resources required by the application.
pub struct Graphics {
    /// The application window
    pub window: Arc<Window>,
    /// Surface of the window, already configured
    pub surface: Surface<'static>,
    /// Configuration the surface was set up with
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device
    pub device: Device,
    /// The device's queue
    pub queue: Queue,
}

/// The message posted back to the event loop once graphics are ready or failed.
pub type GraphicsEvent = Result<Graphics, BackendError>;

/// Captures and hides the cursor so mouse motion always turns the view.
pub fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        warn!("Could not grab the cursor: {err}");
    }
    window.set_cursor_visible(false);
}

/// Creates the window, surface, adapter, device and queue.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window
///
/// # Errors
/// Any step of the bring-up that fails, as a [`BackendError`].
fn create_graphics(event_loop: &ActiveEventLoop) -> Result<Graphics, BackendError> {
    let window_attrs = Window::default_attributes().with_title(WINDOW_TITLE);
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))?;
    info!("Using adapter {:?}", adapter.get_info().name);

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        label: None,
        memory_hints: wgpu::MemoryHints::MemoryUsage,
        trace: wgpu::Trace::Off,
    }))?;

    let size = window.inner_size();

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    grab_cursor(&window);

    Ok(Graphics {
        window,
        surface,
        surface_config,
        device,
        queue,
    })
}

/// Helper struct for the one-time initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<GraphicsEvent>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the first resume to build graphics
    Builder(GraphicsBuilder),

    /// Graphics resources have been handed to the running application
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsEvent>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Builds the graphics resources and posts the outcome to the event loop.
    ///
    /// Does nothing after the first call.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            return;
        };

        let gfx = create_graphics(event_loop);
        if event_loop_proxy.send_event(gfx).is_err() {
            error!("Event loop closed before graphics were delivered");
        }
    }
}
