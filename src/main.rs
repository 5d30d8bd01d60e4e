//! SmartLens - live camera text recognition overlay
//!
//! Opens a device camera, runs on-device text recognition against the live
//! frames, and overlays the most recently recognized text on screen.

mod analyzer;
mod app;
mod capture;
mod config;
mod overlay;
mod shared;
mod vision;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::SmartLensApp;
use crate::capture::fake::FakeCamera;
use crate::capture::{list_cameras, CameraPermission, CameraSource, CaptureConfig};
use crate::config::AppConfig;
use crate::overlay::run_overlay;
use crate::vision::{FakeRecognizer, Recognizer};

/// Phrases the scripted recognizer cycles through in --fake mode.
const DEMO_PHRASES: &[&str] = &["Hello from SmartLens", "", "Exit 21 West", "", "Stop"];

/// SmartLens - live camera text recognition overlay
#[derive(Parser, Debug)]
#[command(name = "smartlens")]
#[command(about = "Reads text from a live camera feed and overlays the latest result")]
struct Args {
    /// Camera device path (overrides the configured device)
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// List available camera devices and exit
    #[arg(long)]
    list_cameras: bool,

    /// Use a synthetic camera and scripted recognizer (no hardware needed)
    #[arg(long)]
    fake: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    // List cameras mode
    if args.list_cameras {
        println!("Available cameras:");
        let cameras = list_cameras();
        if cameras.is_empty() {
            println!("  No cameras detected (build with the v4l2 feature on Linux)");
        } else {
            for camera in &cameras {
                println!(
                    "  [{}] {} - {}",
                    camera.index,
                    camera.path.display(),
                    camera.name.as_deref().unwrap_or("Unknown")
                );
            }
        }
        return Ok(());
    }

    info!("SmartLens starting...");

    // Load or create configuration
    let config = load_or_create_config();
    let mut capture_config = config.camera.to_capture_config();
    if let Some(device) = args.device {
        capture_config.device = device;
    }

    let (camera, permission) = build_camera(&capture_config, args.fake)?;
    let recognizer = build_recognizer(&config.vision, args.fake)?;

    let mut app = SmartLensApp::new();
    app.start(camera, recognizer, permission, config.vision.min_text_len)?;

    // Run the overlay window (blocking) until the user closes it.
    run_overlay(app.display(), config.overlay.to_overlay_config())?;

    app.shutdown();
    info!("SmartLens shutdown complete");

    Ok(())
}

/// Load configuration from file or create default
fn load_or_create_config() -> AppConfig {
    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Pick the camera backend and probe its authorization state.
fn build_camera(
    capture_config: &CaptureConfig,
    fake: bool,
) -> Result<(Box<dyn CameraSource>, CameraPermission)> {
    if fake {
        let camera = FakeCamera::new(capture_config.clone());
        return Ok((Box::new(camera), CameraPermission::Authorized));
    }

    #[cfg(feature = "v4l2")]
    {
        let permission = CameraPermission::probe(&capture_config.device);
        if !permission.is_authorized() {
            info!(
                "camera {} is not accessible",
                capture_config.device.display()
            );
        }
        let camera = crate::capture::v4l2::V4l2Camera::new(capture_config.clone());
        Ok((Box::new(camera), permission))
    }
    #[cfg(not(feature = "v4l2"))]
    {
        anyhow::bail!("no camera backend compiled in (enable the v4l2 feature), or run with --fake")
    }
}

/// Pick the recognition backend.
fn build_recognizer(settings: &config::VisionSettings, fake: bool) -> Result<Box<dyn Recognizer>> {
    if fake {
        return Ok(Box::new(FakeRecognizer::cycling(DEMO_PHRASES)));
    }

    #[cfg(feature = "ocr-ocrs")]
    {
        let model_dir = match &settings.model_dir {
            Some(dir) => PathBuf::from(dir),
            None => config::get_config_dir()?.join("models"),
        };
        Ok(Box::new(crate::vision::OcrsRecognizer::new(&model_dir)?))
    }
    #[cfg(not(feature = "ocr-ocrs"))]
    {
        let _ = settings;
        anyhow::bail!("no OCR backend compiled in (enable the ocr-ocrs feature), or run with --fake")
    }
}
