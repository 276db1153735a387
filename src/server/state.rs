//! Process-wide camera state and the dispatcher state machine.
//!
//! The camera slot is guarded by a single mutex, and every operation holds
//! it for its full duration, hardware I/O included. The device supports
//! only one reader, so coarse serialization is correct; the trade-off is
//! that a stalled driver call blocks every other camera request until it
//! returns. There are no timeouts or retries anywhere in this path.

use crate::capture::{Camera, CameraError, CaptureConfig};
use crate::encode::{encode_jpeg, EncodeError};
use thiserror::Error;
use tokio::sync::Mutex;

/// Result of a successful initialize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The device was opened. Carries the resolution the driver granted,
    /// which may differ from the requested one.
    Initialized {
        /// Granted frame width.
        width: u32,
        /// Granted frame height.
        height: u32,
    },
    /// The device was already open; nothing was touched.
    AlreadyInitialized,
}

/// Result of a successful release operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The device was closed.
    Released,
    /// The device was already closed; hardware was not touched.
    AlreadyReleased,
}

/// Failure modes of the capture operation.
#[derive(Debug, Error)]
pub enum CaptureFault {
    #[error("camera not initialized")]
    NotInitialized,
    #[error(transparent)]
    Frame(CameraError),
    #[error(transparent)]
    Encode(EncodeError),
}

/// Application state shared by all request handlers.
///
/// Owns the single camera slot for the whole process. The slot is either
/// closed (uninitialized) or holds exactly one open device handle; no
/// other component ever references the handle.
pub struct AppState<C: Camera> {
    device: Mutex<C>,
    jpeg_quality: u8,
}

impl<C: Camera> AppState<C> {
    /// Creates the state around an unopened device handle.
    pub fn new(device: C, jpeg_quality: u8) -> Self {
        Self {
            device: Mutex::new(device),
            jpeg_quality,
        }
    }

    /// Opens the device with the given configuration.
    ///
    /// Initializing an already-initialized camera is a no-op that reports
    /// [`InitOutcome::AlreadyInitialized`]; the device is not reopened and
    /// the new configuration is ignored. On open failure the state stays
    /// uninitialized and a later initialize may succeed.
    pub async fn initialize(&self, config: CaptureConfig) -> Result<InitOutcome, CameraError> {
        let mut device = self.device.lock().await;
        if device.is_open() {
            return Ok(InitOutcome::AlreadyInitialized);
        }
        device.open(&config)?;
        let (width, height) = device.resolution().unwrap_or((config.width, config.height));
        Ok(InitOutcome::Initialized { width, height })
    }

    /// Closes the device.
    ///
    /// Releasing an uninitialized camera is a no-op that reports
    /// [`ReleaseOutcome::AlreadyReleased`] without touching hardware. If
    /// the underlying close fails, the state stays initialized and the
    /// caller recovers by retrying release.
    pub async fn release(&self) -> Result<ReleaseOutcome, CameraError> {
        let mut device = self.device.lock().await;
        if !device.is_open() {
            return Ok(ReleaseOutcome::AlreadyReleased);
        }
        device.close()?;
        Ok(ReleaseOutcome::Released)
    }

    /// Captures one frame and encodes it as JPEG.
    ///
    /// A failed read or encode leaves the state initialized; a subsequent
    /// capture may succeed.
    pub async fn capture(&self) -> Result<Vec<u8>, CaptureFault> {
        let mut device = self.device.lock().await;
        if !device.is_open() {
            return Err(CaptureFault::NotInitialized);
        }
        let frame = device.capture().map_err(CaptureFault::Frame)?;
        encode_jpeg(frame, self.jpeg_quality).map_err(CaptureFault::Encode)
    }

    /// Test access to the guarded device.
    #[cfg(test)]
    pub(crate) async fn device(&self) -> tokio::sync::MutexGuard<'_, C> {
        self.device.lock().await
    }

    /// Best-effort release used at process shutdown.
    ///
    /// Close failures are logged and swallowed; there is nobody left to
    /// surface them to.
    pub async fn release_on_shutdown(&self) {
        let mut device = self.device.lock().await;
        if device.is_open() {
            match device.close() {
                Ok(()) => tracing::info!("Camera released on shutdown"),
                Err(e) => tracing::error!(error = %e, "Camera release failed on shutdown"),
            }
        }
    }
}
