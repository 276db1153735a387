//! Camera abstraction for single-frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::{CaptureConfig, Frame};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("failed to release camera: {0}")]
    ReleaseFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// A camera is a single-reader hardware resource: once opened it holds
/// exclusive access to the device until closed. The dispatcher never holds
/// more than one open camera at a time.
pub trait Camera {
    /// Opens the device with the given configuration.
    ///
    /// The driver may grant a resolution different from the requested one;
    /// the granted resolution is available via [`Camera::resolution`].
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    ///
    /// A failed read is surfaced immediately; no retry is attempted.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Returns the resolution actually granted by the driver, if open.
    fn resolution(&self) -> Option<(u32, u32)>;

    /// Closes the camera and releases the device.
    ///
    /// Idempotent: closing an already-closed camera is an `Ok` no-op.
    fn close(&mut self) -> Result<(), CameraError>;
}

/// Mock camera for testing that generates synthetic frames.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
    fail_open: bool,
    fail_next_capture: bool,
    fail_close: bool,
    /// Configurations passed to `open`, in order.
    open_requests: Vec<CaptureConfig>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open` call fail.
    pub fn fail_open(&mut self) {
        self.fail_open = true;
    }

    /// Makes the next `capture` call fail. Subsequent captures succeed.
    pub fn fail_next_capture(&mut self) {
        self.fail_next_capture = true;
    }

    /// Makes `close` fail while the camera is open.
    pub fn fail_close(&mut self, fail: bool) {
        self.fail_close = fail;
    }

    /// Returns the configurations passed to `open`, in order.
    pub fn open_requests(&self) -> &[CaptureConfig] {
        &self.open_requests
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        self.open_requests.push(config.clone());
        if self.fail_open {
            self.fail_open = false;
            return Err(CameraError::DeviceUnavailable(
                "mock open failure".to_owned(),
            ));
        }
        config
            .validate()
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        if self.fail_next_capture {
            self.fail_next_capture = false;
            return Err(CameraError::CaptureFailed(
                "mock capture failure".to_owned(),
            ));
        }

        // Deterministic synthetic pattern, RGB8
        let byte_count = (config.width * config.height) as usize * 3;
        let pixels: Vec<u8> = (0..byte_count)
            .map(|i| ((i as u64 ^ self.sequence) % 256) as u8)
            .collect();

        self.sequence += 1;
        Ok(Frame::new(pixels, config.width, config.height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.config.as_ref().map(|c| (c.width, c.height))
    }

    fn close(&mut self) -> Result<(), CameraError> {
        if self.config.is_some() && self.fail_close {
            return Err(CameraError::ReleaseFailed("mock close failure".to_owned()));
        }
        self.config = None;
        tracing::info!("MockCamera closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::default();

        assert!(!camera.is_open());

        camera.open(&config).unwrap();
        assert!(camera.is_open());
        assert_eq!(camera.resolution(), Some((1280, 720)));

        let frame = camera.capture().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = camera.capture().unwrap();
        assert_eq!(frame2.sequence(), 2);

        camera.close().unwrap();
        assert!(!camera.is_open());
        assert_eq!(camera.resolution(), None);
    }

    #[test]
    fn test_capture_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(
            camera.capture(),
            Err(CameraError::NotInitialized)
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut camera = MockCamera::new();
        camera.close().unwrap();

        camera.open(&CaptureConfig::default()).unwrap();
        camera.close().unwrap();
        camera.close().unwrap();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_capture_failure_is_transient() {
        let mut camera = MockCamera::new();
        camera.open(&CaptureConfig::default()).unwrap();

        camera.fail_next_capture();
        assert!(matches!(
            camera.capture(),
            Err(CameraError::CaptureFailed(_))
        ));

        // Camera stays open and the next read succeeds
        assert!(camera.is_open());
        assert!(camera.capture().is_ok());
    }

    #[test]
    fn test_close_failure_keeps_camera_open() {
        let mut camera = MockCamera::new();
        camera.open(&CaptureConfig::default()).unwrap();
        camera.fail_close(true);

        assert!(matches!(
            camera.close(),
            Err(CameraError::ReleaseFailed(_))
        ));
        assert!(camera.is_open());

        camera.fail_close(false);
        camera.close().unwrap();
        assert!(!camera.is_open());
    }
}
