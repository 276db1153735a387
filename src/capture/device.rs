//! Real camera handle backed by `nokhwa`.

use super::{Camera, CameraError, CaptureConfig, Frame};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};

/// Frame rate requested at open time. Irrelevant for single-frame pulls,
/// but the driver negotiation needs a value.
const REQUESTED_FPS: u32 = 30;

/// A USB/built-in camera device.
///
/// Construction is cheap and touches no hardware; the device is claimed on
/// [`Camera::open`] and held exclusively until [`Camera::close`].
pub struct UsbCamera {
    index: u32,
    inner: Option<nokhwa::Camera>,
    granted: Option<(u32, u32)>,
    sequence: u64,
}

impl UsbCamera {
    /// Creates an unopened handle for the given device index.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            inner: None,
            granted: None,
            sequence: 0,
        }
    }

    /// Returns the device index this handle binds to.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Debug for UsbCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbCamera")
            .field("index", &self.index)
            .field("open", &self.inner.is_some())
            .field("granted", &self.granted)
            .finish()
    }
}

impl Camera for UsbCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        if self.inner.is_some() {
            return Ok(());
        }
        config
            .validate()
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        let requested = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            REQUESTED_FPS,
        );
        // Closest lets the driver grant the nearest supported resolution
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(requested));

        let mut camera = nokhwa::Camera::new(CameraIndex::Index(self.index), format)
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        let granted = camera.resolution();
        tracing::info!(
            device_index = self.index,
            "Camera device opened: requested {}x{}, granted {}x{}",
            config.width,
            config.height,
            granted.width(),
            granted.height()
        );

        self.granted = Some((granted.width(), granted.height()));
        self.inner = Some(camera);
        self.sequence = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let camera = self.inner.as_mut().ok_or(CameraError::NotInitialized)?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        let (width, height) = (image.width(), image.height());
        self.sequence += 1;
        tracing::debug!(sequence = self.sequence, "Captured frame from camera");
        Ok(Frame::new(image.into_raw(), width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.granted
    }

    fn close(&mut self) -> Result<(), CameraError> {
        if let Some(mut camera) = self.inner.take() {
            // Stop errors are not distinguishable from success for the
            // caller; the handle is dropped either way.
            if let Err(e) = camera.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop camera stream on close");
            }
            self.granted = None;
            tracing::info!(device_index = self.index, "Camera device released");
        }
        Ok(())
    }
}
