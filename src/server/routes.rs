//! HTTP surface for the camera dispatcher.
//!
//! Responses use fixed plain-text tokens so callers can switch on the body
//! as well as the status code. Malformed initialize parameters are rejected
//! with 400 rather than coerced; zero dimensions count as malformed.

use super::state::{AppState, CaptureFault, InitOutcome, ReleaseOutcome};
use crate::capture::{Camera, CaptureConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

/// Errors that can occur while running the API server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 8080).into(),
        }
    }
}

impl ServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// HTTP server exposing the camera dispatcher.
pub struct ApiServer<C: Camera + Send + 'static> {
    config: ServerConfig,
    state: Arc<AppState<C>>,
}

impl<C: Camera + Send + 'static> ApiServer<C> {
    /// Creates a new API server around the given camera state.
    pub fn new(config: ServerConfig, state: AppState<C>) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Returns a reference to the shared camera state.
    pub fn state(&self) -> Arc<AppState<C>> {
        Arc::clone(&self.state)
    }

    /// Binds the listener and serves requests until `shutdown` resolves.
    ///
    /// After the listener drains, a best-effort device release runs under
    /// the camera lock; failures there are only logged.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(Arc::clone(&self.state));
        let listener = TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            "Camera API server listening"
        );

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

        self.state.release_on_shutdown().await;
        Ok(())
    }
}

/// Builds the router for the four camera endpoints.
pub fn router<C: Camera + Send + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/camera/init", post(init_camera::<C>))
        .route("/camera/release", post(release_camera::<C>))
        .route("/capture", get(capture_frame::<C>))
        .route("/health", get(health))
        .with_state(state)
}

/// Initialize parameters, accepted via query string or JSON body.
/// Each dimension defaults independently when omitted.
#[derive(Debug, Default, Deserialize)]
struct InitParams {
    width: Option<u32>,
    height: Option<u32>,
}

/// Handler for `POST /camera/init`.
async fn init_camera<C: Camera + Send + 'static>(
    State(state): State<Arc<AppState<C>>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<InitParams>,
    body: Bytes,
) -> Response {
    let from_body: InitParams = if body.is_empty() {
        InitParams::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(ip = %addr.ip(), error = %e, "Malformed init body");
                return (StatusCode::BAD_REQUEST, "bad-request").into_response();
            }
        }
    };

    // Query parameters win over body values per field
    let config = CaptureConfig {
        width: query.width.or(from_body.width).unwrap_or(DEFAULT_WIDTH),
        height: query.height.or(from_body.height).unwrap_or(DEFAULT_HEIGHT),
    };
    if config.validate().is_err() {
        tracing::warn!(ip = %addr.ip(), ?config, "Rejected init with zero dimensions");
        return (StatusCode::BAD_REQUEST, "bad-request").into_response();
    }

    match state.initialize(config.clone()).await {
        Ok(InitOutcome::Initialized { width, height }) => {
            tracing::info!(
                ip = %addr.ip(),
                "Camera initialized via API: requested {}x{}, granted {}x{}",
                config.width,
                config.height,
                width,
                height
            );
            (StatusCode::CREATED, "initialized").into_response()
        }
        Ok(InitOutcome::AlreadyInitialized) => {
            tracing::info!(ip = %addr.ip(), "Camera already initialized");
            (StatusCode::OK, "already-initialized").into_response()
        }
        Err(e) => {
            tracing::error!(ip = %addr.ip(), error = %e, "Camera initialization failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "init-failed").into_response()
        }
    }
}

/// Handler for `POST /camera/release`.
async fn release_camera<C: Camera + Send + 'static>(
    State(state): State<Arc<AppState<C>>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    match state.release().await {
        Ok(ReleaseOutcome::Released) => {
            tracing::info!(ip = %addr.ip(), "Camera released via API");
            (StatusCode::OK, "released").into_response()
        }
        Ok(ReleaseOutcome::AlreadyReleased) => {
            tracing::info!(ip = %addr.ip(), "Camera already released");
            (StatusCode::OK, "already-released").into_response()
        }
        Err(e) => {
            tracing::error!(ip = %addr.ip(), error = %e, "Camera release failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "release-failed").into_response()
        }
    }
}

/// Handler for `GET /capture`.
async fn capture_frame<C: Camera + Send + 'static>(
    State(state): State<Arc<AppState<C>>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    tracing::info!(ip = %addr.ip(), "Capture request");

    match state.capture().await {
        Ok(jpeg) => ([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response(),
        Err(CaptureFault::NotInitialized) => {
            (StatusCode::CONFLICT, "camera-not-initialized").into_response()
        }
        Err(CaptureFault::Frame(e)) => {
            tracing::error!(ip = %addr.ip(), error = %e, "Failed to get frame from camera");
            (StatusCode::INTERNAL_SERVER_ERROR, "no-frame").into_response()
        }
        Err(CaptureFault::Encode(e)) => {
            tracing::error!(ip = %addr.ip(), error = %e, "Failed to encode frame");
            (StatusCode::INTERNAL_SERVER_ERROR, "encode-failed").into_response()
        }
    }
}

/// Handler for `GET /health`. Does not take the camera lock.
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockCamera;

    fn caller() -> ConnectInfo<SocketAddr> {
        ConnectInfo(([127, 0, 0, 1], 40000).into())
    }

    fn app_state() -> State<Arc<AppState<MockCamera>>> {
        State(Arc::new(AppState::new(MockCamera::new(), 90)))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_init_release_tokens() {
        let state = app_state();

        let response = init_camera(
            state.clone(),
            caller(),
            Query(InitParams::default()),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_text(response).await, "initialized");

        let response = init_camera(
            state.clone(),
            caller(),
            Query(InitParams::default()),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "already-initialized");

        let response = release_camera(state.clone(), caller()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "released");

        let response = release_camera(state, caller()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "already-released");
    }

    #[tokio::test]
    async fn test_init_params_from_json_body() {
        let state = app_state();

        let response = init_camera(
            state.clone(),
            caller(),
            Query(InitParams::default()),
            Bytes::from_static(br#"{"width": 640, "height": 480}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let State(state) = state;
        let device = state.device().await;
        assert_eq!(
            device.open_requests(),
            &[CaptureConfig::with_dimensions(640, 480)]
        );
    }

    #[tokio::test]
    async fn test_init_rejects_malformed_body() {
        let response = init_camera(
            app_state(),
            caller(),
            Query(InitParams::default()),
            Bytes::from_static(b"{not json"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "bad-request");
    }

    #[tokio::test]
    async fn test_init_rejects_zero_dimensions() {
        let response = init_camera(
            app_state(),
            caller(),
            Query(InitParams {
                width: Some(0),
                height: None,
            }),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "bad-request");
    }

    #[tokio::test]
    async fn test_capture_when_uninitialized_conflicts() {
        let response = capture_frame(app_state(), caller()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_text(response).await, "camera-not-initialized");
    }

    #[tokio::test]
    async fn test_capture_returns_jpeg() {
        let state = app_state();
        init_camera(
            state.clone(),
            caller(),
            Query(InitParams {
                width: Some(32),
                height: Some(32),
            }),
            Bytes::new(),
        )
        .await;

        let response = capture_frame(state, caller()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("image/jpeg")
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_failed_read_maps_to_no_frame() {
        let state = app_state();
        init_camera(
            state.clone(),
            caller(),
            Query(InitParams {
                width: Some(32),
                height: Some(32),
            }),
            Bytes::new(),
        )
        .await;

        state.0.device().await.fail_next_capture();
        let response = capture_frame(state.clone(), caller()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "no-frame");

        // State stayed initialized; the next capture succeeds
        let response = capture_frame(state, caller()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_release_maps_to_release_failed() {
        let state = app_state();
        init_camera(
            state.clone(),
            caller(),
            Query(InitParams::default()),
            Bytes::new(),
        )
        .await;

        state.0.device().await.fail_close(true);
        let response = release_camera(state.clone(), caller()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "release-failed");

        // Still initialized: capture works after the failed release
        let response = capture_frame(state, caller()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_always_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[test]
    fn test_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_config_with_port() {
        let config = ServerConfig::with_port(3000);
        assert_eq!(config.bind_addr.port(), 3000);
    }
}
