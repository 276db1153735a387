//! Frame Capture API Server
//!
//! Binds the HTTP listener, wires signal handling, and hands the camera
//! handle to the dispatcher. The camera itself is not touched until the
//! first `POST /camera/init`.

use clap::Parser;
use frame_capture::{
    capture::{FileConfig, UsbCamera},
    server::{ApiServer, ServerConfig},
    AppState,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP server exposing a single camera for JPEG frame capture")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index (overrides the config file)
    #[arg(short, long)]
    device: Option<u32>,

    /// Address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// JPEG quality, 1-100 (overrides the config file)
    #[arg(long)]
    jpeg_quality: Option<u8>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let device_index = args.device.unwrap_or(file_config.device.index);
    let address = args.bind.unwrap_or(file_config.server.address);
    let port = args.port.unwrap_or(file_config.server.port);
    let jpeg_quality = args.jpeg_quality.unwrap_or(file_config.encode.jpeg_quality);
    if jpeg_quality == 0 || jpeg_quality > 100 {
        eprintln!("Invalid JPEG quality {} (must be 1-100)", jpeg_quality);
        std::process::exit(1);
    }

    let bind_addr: SocketAddr = match format!("{}:{}", address, port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid bind address {}:{}: {}", address, port, e);
            std::process::exit(1);
        }
    };

    info!("Starting Frame Capture API Server v{}", frame_capture::VERSION);
    info!(device_index, %bind_addr, jpeg_quality, "Configuration resolved");

    let state = AppState::new(UsbCamera::new(device_index), jpeg_quality);
    let server = ApiServer::new(ServerConfig { bind_addr }, state);

    // SIGINT/SIGTERM resolve the graceful-shutdown future; the server then
    // drains and releases the camera under the lock before exiting.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown_tx = std::sync::Mutex::new(Some(shutdown_tx));
    if let Err(e) = ctrlc::set_handler(move || {
        if let Ok(mut guard) = shutdown_tx.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }) {
        eprintln!("Failed to install signal handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server
        .run(async {
            let _ = shutdown_rx.await;
            info!("Shutdown signal received");
        })
        .await
    {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
