//! Camera Capture Layer
//!
//! Delivers frames from a capture backend through a keep-only-latest gate.
//! Backends implement [`CameraSource`]; the V4L2 backend is feature-gated so
//! the pipeline itself builds and tests anywhere.

pub mod fake;
pub mod frame;
pub mod gate;
#[cfg(feature = "v4l2")]
pub mod v4l2;

use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use frame::{Frame, FrameImage, ReleaseHandle, Rotation};
pub use gate::FrameGate;

/// Camera capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture device path
    pub device: PathBuf,
    /// Requested frame width in pixels
    pub width: u32,
    /// Requested frame height in pixels
    pub height: u32,
    /// Maximum frames per second to capture
    pub max_fps: u32,
    /// Rotation the backend reports for captured frames
    pub rotation: Rotation,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/video0"),
            width: 640,
            height: 480,
            max_fps: 30,
            rotation: Rotation::Deg0,
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera disconnected")]
    Disconnected,
    #[error("capture backend error: {0}")]
    Backend(String),
}

/// Blocking pull-based frame delivery.
///
/// Backends own their pacing: `next_frame` blocks until the device produces
/// the next frame. Implementations must be safe to move into the capture
/// thread.
pub trait CameraSource: Send {
    /// Start producing frames.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop producing frames.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Block until the next frame is available.
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;
}

/// Runtime camera authorization state.
///
/// The frame source may only be started in the `Authorized` state; otherwise
/// no frames are ever produced and the overlay never shows text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPermission {
    Authorized,
    Unauthorized,
}

impl CameraPermission {
    pub fn is_authorized(self) -> bool {
        matches!(self, CameraPermission::Authorized)
    }

    /// Probe whether the capture device is accessible to this process.
    pub fn probe(device: &Path) -> Self {
        match File::open(device) {
            Ok(_) => CameraPermission::Authorized,
            Err(_) => CameraPermission::Unauthorized,
        }
    }
}

/// An enumerated capture device
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub index: usize,
    pub path: PathBuf,
    pub name: Option<String>,
}

/// List available capture devices. Empty without a camera backend compiled in.
pub fn list_cameras() -> Vec<CameraInfo> {
    #[cfg(feature = "v4l2")]
    {
        v4l2::enumerate()
    }
    #[cfg(not(feature = "v4l2"))]
    {
        Vec::new()
    }
}
