//! Request dispatcher: camera state plus the HTTP surface over it.
//!
//! # Endpoints
//!
//! | Method & path          | Success                                   | Failure                                                      |
//! |------------------------|-------------------------------------------|--------------------------------------------------------------|
//! | `POST /camera/init`    | 201 `initialized`, 200 `already-initialized` | 400 `bad-request`, 500 `init-failed`                      |
//! | `POST /camera/release` | 200 `released`, 200 `already-released`    | 500 `release-failed`                                         |
//! | `GET /capture`         | 200, `image/jpeg` body                    | 409 `camera-not-initialized`, 500 `no-frame`, 500 `encode-failed` |
//! | `GET /health`          | 200 `ok`                                  | —                                                            |
//!
//! All camera operations are serialized by one lock held for the full
//! operation, hardware I/O included.

mod routes;
mod state;

pub use routes::{router, ApiServer, ServerConfig, ServerError};
pub use state::{AppState, CaptureFault, InitOutcome, ReleaseOutcome};
