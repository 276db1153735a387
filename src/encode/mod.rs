//! JPEG encoding of raw frames.
//!
//! Encoding failures are deliberately distinct from capture failures: a
//! frame can be read from the driver and still be malformed (wrong buffer
//! size for its dimensions), which callers need to tell apart from a
//! failed hardware read.

use crate::capture::Frame;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

/// Errors that can occur while encoding a frame.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("frame buffer does not match its dimensions")]
    InvalidFrame,
    #[error("jpeg encoding failed: {0}")]
    EncodeFailed(String),
}

/// Encodes a raw RGB8 frame into baseline JPEG bytes.
///
/// `quality` is the JPEG quality factor (1-100).
pub fn encode_jpeg(frame: Frame, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if !frame.is_valid() {
        return Err(EncodeError::InvalidFrame);
    }

    let (width, height) = (frame.width(), frame.height());
    let image: RgbImage = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
        width,
        height,
        frame.into_pixels(),
    )
    .ok_or(EncodeError::InvalidFrame)?;

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(&image)
        .map_err(|e| EncodeError::EncodeFailed(e.to_string()))?;
    Ok(buf)
}
