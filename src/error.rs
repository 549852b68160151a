//! # Error Types
//!
//! Error enums for the few places where the explorer can actually fail:
//! chunk-local voxel access, configuration loading, and graphics backend
//! initialization. Everything else (missing targets, rejected edits, unknown
//! materials) is a normal outcome and is handled where it happens.

use std::path::PathBuf;

use cgmath::Point3;
use thiserror::Error;

/// Errors raised by chunk-local voxel storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// A local coordinate fell outside the fixed chunk extent.
    #[error("local voxel coordinate ({}, {}, {}) is outside the chunk extent of {extent}", .position.x, .position.y, .position.z)]
    OutOfBounds {
        /// The offending local coordinate.
        position: Point3<i32>,
        /// The chunk dimension along every axis.
        extent: i32,
    },
}

/// Errors raised while reading the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path of the file that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for `EngineConfig`.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path of the file that was requested.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A field holds a value the engine cannot work with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was refused.
        reason: String,
    },
}

/// Errors raised while bringing up or driving the GPU backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// The rendering surface could not be created for the window.
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    /// No adapter compatible with the surface was found.
    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to hand out a device.
    #[error("failed to request graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// The surface ran out of memory while acquiring a frame.
    #[error("surface out of memory")]
    OutOfMemory,
}
