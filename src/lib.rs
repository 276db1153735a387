//! Frame Capture Service Library
//!
//! Exposes a single physical camera device over HTTP: callers initialize it
//! with a requested resolution, pull individual JPEG-encoded frames on
//! demand, and release the underlying hardware handle.
//!
//! # Architecture
//!
//! ```text
//! HTTP request → server (one lock, two states) → capture (device handle)
//!                                     ↓
//!                                  encode (JPEG)
//! ```
//!
//! # Design Principles
//!
//! - **One handle**: at most one open device handle exists per process
//! - **Coarse serialization**: every camera operation holds a single lock
//!   for its full duration, hardware I/O included; the device is
//!   single-reader hardware and fine-grained locking would buy nothing
//! - **No retries**: a failed read or a stalled driver call is surfaced
//!   (or waited on) as-is; callers re-issue requests
//!
//! # Example
//!
//! ```no_run
//! use frame_capture::{
//!     capture::{Camera, CaptureConfig, MockCamera},
//!     encode::encode_jpeg,
//! };
//!
//! let mut camera = MockCamera::new();
//! camera.open(&CaptureConfig::default()).unwrap();
//!
//! let frame = camera.capture().unwrap();
//! let jpeg = encode_jpeg(frame, 90).unwrap();
//! assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
//!
//! camera.close().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod encode;
pub mod server;

// Re-export commonly used types at crate root
pub use capture::{Camera, CameraError, CaptureConfig, Frame, MockCamera, UsbCamera};
pub use encode::{encode_jpeg, EncodeError};
pub use server::{ApiServer, AppState, ServerConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
