//! Camera input and frame handling.
//!
//! This module provides abstractions for opening a single camera device,
//! pulling individual frames from it, and releasing it. The camera is a
//! single-reader resource: exactly one open handle may exist at a time.

mod camera;
mod config;
mod device;
mod frame;

pub use camera::{Camera, CameraError, MockCamera};
pub use config::{
    CaptureConfig, ConfigError, DeviceConfig, EncodeConfig, FileConfig, ListenConfig,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use device::UsbCamera;
pub use frame::Frame;
